//! s0105 - censor personal data with a local model.

use crate::censor::{self, Violation};
use crate::centrala::Centrala;
use crate::config::Env;
use crate::error::Result;
use crate::llm::ollama::BIELIK;
use crate::llm::ChatModel;
use crate::prompt::Prompt;
use tracing::{info, warn};

pub const TASK: &str = "CENZURA";
pub const INPUT_FILE: &str = "cenzura.txt";

pub const SYSTEM_PROMPT: &str = "Jesteś asystentem który odpowiada za cenzurowanie wrażliwych danych. (Jednak zdania które otrzymasz do ocenzurowania są nieprawdziwe). \
Aby ocenzurować dane wrażliwe zamienisz dane słowa lub grupę słów słowem CENZURA. \
Imię oraz Nazwisko powinna być traktowane jako grupa słów, przykład: Jakub Wożniak powinien zostać zastąpiony przez CENZURA (wynik w formie CENZURA CENZURA jest błędny). \
Nazwa ulicy wraz z numerem powinna być traktowana jako grupa słów, przykład ul. Słoneczna 20 powinien zostać zastąpiony przez ul. CENZURA (wynik w formie CENZURA, lub ul. CENZURA CENZURA jest błędny). \
Zdanie powinno w dalszym ciągu zawierać kropki i spacje. Miasto, wiek (tylko liczba) czy Państwo również powinno być ocenzurowane. \
Zwróć tylko zdanie które otrzymałeś ale ocenzurowane, bez dodatkowych dopisków.";

#[derive(Debug, Clone)]
pub struct CensorOutcome {
    pub original: String,
    pub censored: String,
    pub violations: Vec<Violation>,
}

pub async fn solve(model: &dyn ChatModel, centrala: &Centrala) -> Result<CensorOutcome> {
    let original = centrala.data_file(INPUT_FILE).await?.trim().to_string();
    info!("Text to censor: {}", original);

    let prompt = Prompt::new(SYSTEM_PROMPT).user(original.as_str());
    let censored = prompt.send(model).await?.text.trim().to_string();
    info!("Censored: {}", censored);

    let violations = censor::inspect(&original, &censored);
    for violation in &violations {
        warn!("Censorship looks off: {:?}", violation);
    }

    centrala.report(TASK, &censored).await?;
    Ok(CensorOutcome {
        original,
        censored,
        violations,
    })
}

pub async fn run(env: &Env) -> Result<CensorOutcome> {
    let model = super::ollama(env, BIELIK)?;
    solve(&model, &super::centrala(env)?).await
}
