//! Assistant endpoints

use axum::{extract::State, Json};

use crate::ai::{AssistantAnswer, AssistantInput, Capabilities, Intent};
use crate::error::Result;
use crate::extractors::ApiJson;
use crate::models::AiAnswerResponse;
use crate::AppState;

fn respond(answer: AssistantAnswer) -> Json<AiAnswerResponse> {
    Json(AiAnswerResponse {
        success: true,
        answer: answer.answer,
        model: answer.model,
        intent: answer.intent,
    })
}

pub async fn handle_capabilities(State(state): State<AppState>) -> Json<Capabilities> {
    Json(state.assistant.capabilities())
}

/// Tutor chat; an explicit non-tutor `intent` is dispatched to that intent.
pub async fn handle_tutor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AssistantInput>,
) -> Result<Json<AiAnswerResponse>> {
    let request = AssistantInput {
        message: input.message,
        history: input.history,
        context: input.context,
        ..Default::default()
    };
    let answer = state
        .assistant
        .run_requested(input.intent.as_deref(), &request)
        .await?;
    Ok(respond(answer))
}

pub async fn handle_guide(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AssistantInput>,
) -> Result<Json<AiAnswerResponse>> {
    let request = AssistantInput {
        message: input.message,
        context: input.context,
        ..Default::default()
    };
    let answer = state.assistant.run(Intent::GuideThreeSteps, &request).await?;
    Ok(respond(answer))
}

pub async fn handle_rewrite(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AssistantInput>,
) -> Result<Json<AiAnswerResponse>> {
    let request = AssistantInput {
        message: input.message,
        context: input.context,
        ..Default::default()
    };
    let answer = state.assistant.run(Intent::RewriteEmail, &request).await?;
    Ok(respond(answer))
}

pub async fn handle_next_course(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AssistantInput>,
) -> Result<Json<AiAnswerResponse>> {
    let request = AssistantInput {
        objective: input.objective,
        completed_modules: input.completed_modules,
        context: input.context,
        ..Default::default()
    };
    let answer = state.assistant.run(Intent::NextCourse, &request).await?;
    Ok(respond(answer))
}
