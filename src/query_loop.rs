//! Query/answer dialogue with a model
//!
//! The model either asks for more data (`query: <sql>`) or gives the final
//! result (`answer: a, b, c`). Each query is executed and its raw result is
//! appended as a new user turn. There is no iteration cap: the loop ends on
//! the first `answer:` reply or on the first error.

use crate::centrala::QueryExecutor;
use crate::error::{Error, Result};
use crate::llm::ChatModel;
use crate::prompt::Prompt;
use std::time::Duration;
use tracing::{debug, info};

const QUERY_PREFIX: &str = "query:";
const ANSWER_PREFIX: &str = "answer:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Query(String),
    Answer(Vec<String>),
}

impl Reply {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Some(sql) = text.strip_prefix(QUERY_PREFIX) {
            return Ok(Reply::Query(sql.trim().to_string()));
        }
        if let Some(answer) = text.strip_prefix(ANSWER_PREFIX) {
            let items = answer
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            return Ok(Reply::Answer(items));
        }
        Err(Error::UnrecognizedReply(text.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub answer: Vec<String>,
    pub queries: usize,
}

/// Drive the dialogue until the model answers. `pause` is slept after each
/// executed query.
pub async fn run_query_loop<M, Q>(
    model: &M,
    executor: &Q,
    mut prompt: Prompt,
    pause: Duration,
) -> Result<LoopOutcome>
where
    M: ChatModel + ?Sized,
    Q: QueryExecutor + ?Sized,
{
    let mut queries = 0;
    loop {
        let completion = prompt.send(model).await?;
        info!("Model reply: {}", completion.text);

        match Reply::parse(&completion.text)? {
            Reply::Query(sql) => {
                let result = executor.execute(&sql).await?;
                queries += 1;
                debug!("Query #{} returned {} bytes", queries, result.len());
                prompt.push_user(format!("Additional Data: {}", result));
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
            }
            Reply::Answer(answer) => {
                info!("Final answer after {} queries: {:?}", queries, answer);
                return Ok(LoopOutcome { answer, queries });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_is_trimmed_and_split() {
        assert_eq!(
            Reply::parse("answer: 123, 321").unwrap(),
            Reply::Answer(vec!["123".to_string(), "321".to_string()])
        );
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(
            Reply::parse("  query: select * from users where is_active=0\n").unwrap(),
            Reply::Query("select * from users where is_active=0".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_reply() {
        let err = Reply::parse("I think the answer is 4278").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedReply(_)));
    }

    #[test]
    fn test_prefix_must_lead() {
        assert!(Reply::parse("The answer: 1").is_err());
    }
}
