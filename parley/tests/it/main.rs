mod derive;
mod engine;
mod forwarding;
mod help;
mod prompting;

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use parley::{ParseConfig, PromptRequest, Prompter, Value, errors::MaxAttemptsExceeded};

/// Answers prompts from a fixed script, and records which fields were asked
/// for. Clones share the same script and record.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: Arc<Mutex<VecDeque<Value>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Value>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            asked: Arc::default(),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, request: &PromptRequest<'_>) -> Result<Value, MaxAttemptsExceeded> {
        self.asked.lock().unwrap().push(request.field.to_owned());

        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(MaxAttemptsExceeded {
                attempts: request.max_attempts,
            })
    }
}

/// A config that never touches the terminal
pub fn config() -> ParseConfig {
    config_with(&ScriptedPrompter::default())
}

pub fn config_with(prompter: &ScriptedPrompter) -> ParseConfig {
    ParseConfig::default().prompter(prompter.clone())
}
