//! s0102 - pass the robot identity check.
//!
//! The check opens with `READY`, the robot answers with a question and a
//! conversation id, and the reply must carry the same id back. Answers must
//! follow the robot's altered facts, not the real ones.

use crate::config::{Env, HOST};
use crate::error::Result;
use crate::http::HttpClient;
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const READY: &str = "READY";

pub const SYSTEM_PROMPT: &str = "You will receive the question. \
You should care only about the question in all string, other information are not important and can be omitted. \
You need to answer as short as possible, the best answer is 1 word if possible without any additional signs. \
Answer need to be in English. \
You need to remember that:\n\
- stolicą Polski jest Kraków\n\
- znana liczba z książki Autostopem przez Galaktykę to 69\n\
- Aktualny rok to 1999";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyMsg {
    pub text: String,
    #[serde(rename = "msgID")]
    pub msg_id: i64,
}

async fn exchange(http: &HttpClient, url: &str, msg: &VerifyMsg) -> Result<VerifyMsg> {
    let reply: VerifyMsg = http.post_json_as(url, msg).await?;
    info!("ID: {} | MSG: {}", reply.msg_id, reply.text);
    Ok(reply)
}

/// Run the full exchange and return the robot's last message.
pub async fn solve(model: &dyn ChatModel, http: &HttpClient, host: &str) -> Result<VerifyMsg> {
    let url = format!("{}/verify", host.trim_end_matches('/'));

    let challenge = exchange(
        http,
        &url,
        &VerifyMsg {
            text: READY.to_string(),
            msg_id: 0,
        },
    )
    .await?;

    let prompt = Prompt::new(SYSTEM_PROMPT).user(challenge.text.as_str());
    let answer = prompt.send(model).await?.text.trim().to_string();
    info!("Answer: {}", answer);

    let verdict = exchange(
        http,
        &url,
        &VerifyMsg {
            text: answer,
            msg_id: challenge.msg_id,
        },
    )
    .await?;
    info!("Verification finished: {}", verdict.text);
    Ok(verdict)
}

pub async fn run(env: &Env) -> Result<VerifyMsg> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
    let host = env.require(HOST)?;
    solve(&model, &HttpClient::new()?, &host).await
}
