//! Prompt construction for the assistant intents

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::AiError;
use crate::validation::sanitize::truncate_chars;

pub const SYSTEM_PROMPT: &str = "Tu es Promethee, un assistant informatique francophone, calme et utile.
Tu aides des particuliers, etudiants, independants et petites equipes.
Regles:
- Reponds en francais simple.
- Evite le jargon inutile.
- Structure les reponses en etapes numerotees quand cela aide.
- Reste concret et oriente execution.
- Signale quand une verification humaine reste necessaire.
- Termine si possible par une prochaine action claire.";

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_OBJECTIVE_CHARS: usize = 800;
pub const MAX_MODULE_CHARS: usize = 120;
pub const MAX_MODULES: usize = 8;
pub const MAX_HISTORY_ENTRIES: usize = 6;
pub const MAX_HISTORY_CHARS: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "tutor")]
    Tutor,
    #[serde(rename = "guide_3_steps")]
    GuideThreeSteps,
    #[serde(rename = "rewrite_email")]
    RewriteEmail,
    #[serde(rename = "next_course")]
    NextCourse,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Tutor,
        Intent::GuideThreeSteps,
        Intent::RewriteEmail,
        Intent::NextCourse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Tutor => "tutor",
            Intent::GuideThreeSteps => "guide_3_steps",
            Intent::RewriteEmail => "rewrite_email",
            Intent::NextCourse => "next_course",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Intent::RewriteEmail => 0.2,
            _ => 0.35,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = AiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == value)
            .ok_or_else(|| AiError::InvalidRequest("Le type de demande IA est invalide.".to_string()))
    }
}

/// Free-form input accepted by every assistant endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantInput {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Value>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub completed_modules: Option<Value>,
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Maps free-text page context to the topic named in the prompt.
pub fn infer_topic(context: Option<&str>) -> &'static str {
    let value = context.unwrap_or_default().to_lowercase();
    let rules: [(&str, &str); 7] = [
        ("excel", "Excel"),
        ("word", "Word"),
        ("powerpoint", "PowerPoint"),
        ("cv", "CV et candidature"),
        ("document", "documents et rapports"),
        ("ia", "outils IA et productivite"),
        ("reservation", "devis et reservation"),
    ];

    rules
        .iter()
        .find(|(keyword, _)| value.contains(keyword))
        .map(|(_, topic)| *topic)
        .unwrap_or("accompagnement informatique general")
}

/// Keeps the last user/assistant turns with string content.
pub fn sanitize_history(history: Option<&Value>) -> Vec<ChatMessage> {
    let Some(entries) = history.and_then(Value::as_array) else {
        return Vec::new();
    };

    let valid: Vec<ChatMessage> = entries
        .iter()
        .filter_map(|entry| {
            let role = entry.get("role")?.as_str()?;
            let content = entry.get("content")?.as_str()?;
            matches!(role, "user" | "assistant")
                .then(|| ChatMessage::new(role, truncate_chars(content.trim(), MAX_HISTORY_CHARS)))
        })
        .collect();

    let skip = valid.len().saturating_sub(MAX_HISTORY_ENTRIES);
    valid.into_iter().skip(skip).collect()
}

fn clean(value: Option<&str>, max_chars: usize) -> String {
    truncate_chars(value.unwrap_or_default().trim(), max_chars)
}

fn completed_modules(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(clean(Some(text), MAX_MODULE_CHARS)),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .filter(|item| !item.is_empty())
        .take(MAX_MODULES)
        .collect()
}

fn required_message(message: String, error: &str) -> Result<String, AiError> {
    if message.is_empty() {
        Err(AiError::InvalidRequest(error.to_string()))
    } else {
        Ok(message)
    }
}

pub fn build_task_instruction(
    intent: Intent,
    topic: &str,
    input: &AssistantInput,
) -> Result<String, AiError> {
    let message = clean(input.message.as_deref(), MAX_MESSAGE_CHARS);

    match intent {
        Intent::GuideThreeSteps => {
            let message =
                required_message(message, "Le message est requis pour le guide en 3 etapes.")?;
            Ok(format!(
                "Mission: explique ce sujet en exactement 3 etapes utiles.\n\
                 Sujet: {message}\n\
                 Contexte du site: {topic}\n\
                 Style: phrases courtes, une mise en garde finale si necessaire."
            ))
        }
        Intent::RewriteEmail => {
            let message = required_message(message, "Le message est requis pour la reecriture.")?;
            Ok(format!(
                "Mission: reformule le texte en message ou email clair, poli et directement exploitable.\n\
                 Texte de base:\n\
                 {message}\n\
                 Contexte du site: {topic}\n\
                 Format attendu:\n\
                 1) Objet suggere si pertinent\n\
                 2) Version finale\n\
                 3) Mini conseil d'envoi"
            ))
        }
        Intent::NextCourse => {
            let modules = completed_modules(input.completed_modules.as_ref());
            let modules = if modules.is_empty() {
                "Aucun module fourni".to_string()
            } else {
                modules.join(", ")
            };
            let objective = clean(input.objective.as_deref(), MAX_OBJECTIVE_CHARS);
            let objective = if objective.is_empty() {
                "ameliorer sa productivite informatique".to_string()
            } else {
                objective
            };
            Ok(format!(
                "Mission: proposer la prochaine formation ou action la plus utile pour cet utilisateur.\n\
                 Modules deja vus: {modules}\n\
                 Objectif declare: {objective}\n\
                 Contexte du site: {topic}\n\
                 Format attendu:\n\
                 1) Prochaine priorite\n\
                 2) Pourquoi ce choix\n\
                 3) Mini plan d'action"
            ))
        }
        Intent::Tutor => {
            let message = required_message(message, "Le message est requis.")?;
            Ok(format!(
                "Question utilisateur: {message}\nContexte du site: {topic}"
            ))
        }
    }
}

/// System prompt, then tutor history, then the task.
pub fn build_messages(
    intent: Intent,
    history: Option<&Value>,
    task_instruction: String,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::new("system", SYSTEM_PROMPT)];
    if intent == Intent::Tutor {
        messages.extend(sanitize_history(history));
    }
    messages.push(ChatMessage::new("user", task_instruction));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(message: &str) -> AssistantInput {
        AssistantInput {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_intent_parsing() {
        assert_eq!("guide_3_steps".parse::<Intent>().unwrap(), Intent::GuideThreeSteps);
        assert_eq!("tutor".parse::<Intent>().unwrap(), Intent::Tutor);
        assert!(matches!("essay".parse::<Intent>(), Err(AiError::InvalidRequest(_))));
        assert_eq!(serde_json::to_value(Intent::NextCourse).unwrap(), "next_course");
    }

    #[test]
    fn test_temperature_per_intent() {
        assert_eq!(Intent::RewriteEmail.temperature(), 0.2);
        assert_eq!(Intent::Tutor.temperature(), 0.35);
    }

    #[test]
    fn test_infer_topic() {
        assert_eq!(infer_topic(Some("Module EXCEL avance")), "Excel");
        assert_eq!(infer_topic(Some("page powerpoint")), "PowerPoint");
        assert_eq!(infer_topic(Some("reservation")), "devis et reservation");
        assert_eq!(infer_topic(None), "accompagnement informatique general");
    }

    #[test]
    fn test_history_keeps_last_six_valid_turns() {
        let mut entries: Vec<Value> = (0..8)
            .map(|i| json!({ "role": "user", "content": format!("  q{}  ", i) }))
            .collect();
        entries.push(json!({ "role": "system", "content": "ignore" }));
        entries.push(json!({ "role": "assistant", "content": 42 }));
        entries.push(json!("garbage"));
        entries.push(json!({ "role": "assistant", "content": "x".repeat(2000) }));

        let history = sanitize_history(Some(&Value::Array(entries)));
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].content, "q3");
        assert_eq!(history[5].role, "assistant");
        assert_eq!(history[5].content.chars().count(), MAX_HISTORY_CHARS);

        assert!(sanitize_history(Some(&json!({"role": "user"}))).is_empty());
        assert!(sanitize_history(None).is_empty());
    }

    #[test]
    fn test_message_required_except_next_course() {
        for intent in [Intent::Tutor, Intent::GuideThreeSteps, Intent::RewriteEmail] {
            let err = build_task_instruction(intent, "Excel", &input("   ")).unwrap_err();
            assert!(matches!(err, AiError::InvalidRequest(_)));
        }
        assert!(build_task_instruction(Intent::NextCourse, "Excel", &AssistantInput::default()).is_ok());
    }

    #[test]
    fn test_next_course_uses_defaults_and_limits() {
        let request = AssistantInput {
            completed_modules: Some(json!(["Excel", "", 7, null, "a", "b", "c", "d", "e", "f", "g"])),
            ..Default::default()
        };
        let task = build_task_instruction(Intent::NextCourse, "Excel", &request).unwrap();
        assert!(task.contains("Modules deja vus: Excel, 7, a, b, c, d, e, f\n"));
        assert!(task.contains("Objectif declare: ameliorer sa productivite informatique"));

        let empty = build_task_instruction(Intent::NextCourse, "Word", &AssistantInput::default()).unwrap();
        assert!(empty.contains("Aucun module fourni"));
    }

    #[test]
    fn test_message_is_truncated() {
        let long = "m".repeat(MAX_MESSAGE_CHARS + 50);
        let task = build_task_instruction(Intent::Tutor, "Word", &input(&long)).unwrap();
        assert!(task.contains(&"m".repeat(MAX_MESSAGE_CHARS)));
        assert!(!task.contains(&"m".repeat(MAX_MESSAGE_CHARS + 1)));
    }

    #[test]
    fn test_history_only_for_tutor() {
        let history = json!([{ "role": "user", "content": "avant" }]);

        let tutor = build_messages(Intent::Tutor, Some(&history), "task".to_string());
        assert_eq!(tutor.len(), 3);
        assert_eq!(tutor[0].content, SYSTEM_PROMPT);
        assert_eq!(tutor[1].content, "avant");
        assert_eq!(tutor[2], ChatMessage::new("user", "task"));

        let guide = build_messages(Intent::GuideThreeSteps, Some(&history), "task".to_string());
        assert_eq!(guide.len(), 2);
    }
}
