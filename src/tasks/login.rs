//! s0101 - log into the robot page by answering its anti-human question.

use crate::config::{Env, AGENT_PASSWORD, AGENT_USER, HOST};
use crate::error::Result;
use crate::http::HttpClient;
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use crate::scrape::extract_question;
use tracing::info;

pub const SYSTEM_PROMPT: &str = "You will receive the question. You need to answer as short as possible, the best answer is 1 word if possible.";

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub question: String,
    pub answer: String,
    /// Body of the page returned after the form was posted.
    pub page: String,
}

pub async fn solve(
    model: &dyn ChatModel,
    http: &HttpClient,
    host: &str,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let page = http.get_text(host).await?;
    let question = extract_question(&page)?;
    info!("Extracted question: {}", question);

    let prompt = Prompt::new(SYSTEM_PROMPT).user(question.as_str());
    let answer = prompt.send(model).await?.text.trim().to_string();
    info!("Answer: {}", answer);

    let page = http
        .post_form(
            host,
            &[
                ("username", username),
                ("password", password),
                ("answer", answer.as_str()),
            ],
        )
        .await?;
    info!("Logged in, response: {}", page);

    Ok(LoginOutcome {
        question,
        answer,
        page,
    })
}

pub async fn run(env: &Env) -> Result<LoginOutcome> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
    let host = env.require(HOST)?;
    let username = env.require(AGENT_USER)?;
    let password = env.require(AGENT_PASSWORD)?;
    solve(&model, &HttpClient::new()?, &host, &username, &password).await
}
