use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::AnswerRequest,
        response::{
            AnswerResponse, GameProgressView, GameQuestionsResponse, GameResultResponse,
            GameSessionView, GameStartResponse,
        },
    },
};

#[post("/start")]
pub async fn start_game(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let session = state.game_service.start_game(&auth.0.sub).await?;

    log::info!("Game {} started for user {}", session.id_hex(), auth.0.sub);

    Ok(HttpResponse::Ok().json(GameStartResponse::from(&session)))
}

#[post("/answer/{game_id}/{question_id}")]
pub async fn submit_answer(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    request: web::Json<AnswerRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (game_id, question_id) = path.into_inner();

    state
        .game_service
        .submit_answer(&game_id, &question_id, &request)
        .await?;

    Ok(HttpResponse::Ok().json(AnswerResponse { success: true }))
}

#[get("/questions/{game_id}")]
pub async fn get_questions(
    state: web::Data<Arc<AppState>>,
    game_id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let session = state.game_service.get_game(&game_id).await?;

    // Progress view: answers stay hidden until the result route
    Ok(HttpResponse::Ok().json(GameQuestionsResponse {
        game: GameProgressView::from(&session),
    }))
}

#[get("/result/{game_id}")]
pub async fn get_result(
    state: web::Data<Arc<AppState>>,
    game_id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (session, score) = state.game_service.get_result(&game_id).await?;

    log::info!("Game {} scored {}/{}", session.id_hex(), score, session.questions.len());

    Ok(HttpResponse::Ok().json(GameResultResponse {
        game: GameSessionView::from(&session),
        score,
    }))
}
