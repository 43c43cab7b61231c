//! s0303 - find active datacenters run by managers on leave.
//!
//! The model gets table definitions and a full dump up front, and may ask
//! for more through the query loop.

use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::llm::openai::GPT_4O_MINI;
use crate::llm::{ChatModel, SamplingParams};
use crate::prompt::Prompt;
use crate::query_loop::{run_query_loop, LoopOutcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TASK: &str = "database";
pub const TABLES: [&str; 3] = ["users", "datacenters", "connections"];

pub const QUESTION: &str = "Which active datacenters (DC_ID) are managed by employees which are on leave (is_active=0). \
The final response should contain only datacenters ID (DC_ID) and look like -> answer: 123, 321, 111.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStructure {
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "Create Table")]
    pub create_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub access_level: String,
    pub is_active: String,
    pub lastlog: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datacenter {
    pub dc_id: String,
    pub location: String,
    pub manager: String,
    pub is_active: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub user1_id: String,
    pub user2_id: String,
}

/// Everything the model sees before its first turn.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub structures: Vec<TableStructure>,
    pub users: Vec<User>,
    pub datacenters: Vec<Datacenter>,
    pub connections: Vec<Connection>,
}

impl Snapshot {
    pub async fn fetch(centrala: &Centrala) -> Result<Self> {
        let mut structures = Vec::new();
        for table in TABLES {
            structures.extend(
                centrala
                    .select::<TableStructure>(&format!("show create table {}", table))
                    .await?,
            );
        }
        Ok(Self {
            structures,
            users: centrala.select("select * from users").await?,
            datacenters: centrala.select("select * from datacenters").await?,
            connections: centrala.select("select * from connections").await?,
        })
    }

    pub fn system_prompt(&self) -> Result<String> {
        Ok(format!(
            "You are powerful assistant which needs to help me to extract data from one database. \
Database has tables: users, datacenters, connections. Tables structure is presented in the below jsons: \n{}\n\
Table `users` contain following data: \n{}\n\
Table `datacenters` contain following data: \n{}\n\
Table `connections` contain following data: \n{}\n\
Your goal is to help me further search the database to answer different questions. \
You can answer in two ways: \
1. If you need to do a query to the database to get more data you should send SQL query (everything in lowercase), then your answer should look like: \"query: <sql_query>\". For example: query: select * from users where is_active=1 \
2. If you know the answer to my question you need to respond only in the format like: answer: <answer to my question> \
Next message will contain my question.",
            serde_json::to_string(&self.structures)?,
            serde_json::to_string(&self.users)?,
            serde_json::to_string(&self.datacenters)?,
            serde_json::to_string(&self.connections)?,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub pause: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(5),
        }
    }
}

pub async fn solve(
    model: &dyn ChatModel,
    centrala: &Centrala,
    options: &Options,
) -> Result<LoopOutcome> {
    let snapshot = Snapshot::fetch(centrala).await?;
    let prompt = Prompt::new(snapshot.system_prompt()?).user(QUESTION);

    let outcome = run_query_loop(model, centrala, prompt, options.pause).await?;
    centrala.report(TASK, &outcome.answer).await?;
    Ok(outcome)
}

pub async fn run(env: &Env, options: &Options) -> Result<LoopOutcome> {
    let model = super::openai(env, GPT_4O_MINI, SamplingParams::default())?;
    solve(&model, &super::centrala(env)?, options).await
}
