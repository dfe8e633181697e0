use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const SUMMARY_STOP: &str = "<|END_SAMENVATTING|>";
pub const ABSTRACTION_STOP: &str = "<|END_ABSTRACTIE|>";
pub const TRANSLATION_STOP: &str = "<|END_TRANSLATION|>";
pub const CUSTOM_STOP: &str = "<|END_OUTPUT|>";
pub const DEFAULT_STOP: &str = "<|END_REACTIE|>";

/// Language used for translations when the caller did not name one.
const FALLBACK_LANGUAGE: &str = "Engels";

const ABSTRACTION_GUIDELINES: &str = "Je taak is om een klinische abstractie te maken van de onderstaande rapportage. Let op: je mag intern redeneren, maar in je output mag alleen de uiteindelijke abstractie verschijnen — géén tussenstappen, géén uitleg, géén interne gedachten.

Volg deze richtlijnen bij het maken van de abstractie:

1. Voeg geen nieuwe informatie toe en trek geen conclusies die niet letterlijk in de rapportage staan.
2. Behoud alle belangrijke elementen, zoals:
   - observaties
   - benoemde emoties
   - klachten (fysiek of mentaal)
   - reacties op omgeving of begeleiding
   - uitgesproken voorkeuren of behoeftes
3. Noem alle uitgevoerde acties en gemaakte afspraken expliciet.
4. Neem oorzaak-gevolgrelaties op zoals die in de tekst benoemd worden.
5. Zorg voor correct en verzorgd Nederlands in de abstractie.
6. Sluit je output af met exact de volgende woorden: ";

const SUMMARY_GUIDELINES: &str = "Je taak is om een beknopte samenvatting te maken van de onderstaande rapportage. In je output mag alleen de samenvatting verschijnen, zonder uitleg.

1. Voeg geen nieuwe informatie toe.
2. Beperk je tot de belangrijkste observaties, klachten, acties en afspraken.
3. Schrijf in correct en verzorgd Nederlands.
4. Sluit je output af met exact de volgende woorden: ";

/// The kind of text processing a request asks for. Every variant owns exactly one template.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Summarize,
    Abstract,
    Translate,
    Custom,
    Default,
}

impl TaskType {
    /// Resolves a task name as sent by callers. Unknown names resolve to [`TaskType::Default`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "summarize" | "summarization" => TaskType::Summarize,
            "abstract" | "abstraction" => TaskType::Abstract,
            "translate" | "translation" => TaskType::Translate,
            "custom" | "customwithmetadata" => TaskType::Custom,
            "default" => TaskType::Default,
            other => {
                tracing::warn!(task = other, "Unknown task type, using the default template");
                TaskType::Default
            }
        }
    }

    pub fn stop_sequence(&self) -> &'static str {
        match self {
            TaskType::Summarize => SUMMARY_STOP,
            TaskType::Abstract => ABSTRACTION_STOP,
            TaskType::Translate => TRANSLATION_STOP,
            TaskType::Custom => CUSTOM_STOP,
            TaskType::Default => DEFAULT_STOP,
        }
    }

    pub fn template(&self, metadata: &PromptMetadata) -> PromptTemplate {
        let stop_sequence = self.stop_sequence();
        match self {
            TaskType::Summarize => PromptTemplate {
                header: "### Instruction:",
                instruction: format!("{SUMMARY_GUIDELINES}{stop_sequence}"),
                input_marker: "### Input:",
                output_marker: "### Output:\n<|SAMENVATTING_START|>",
                stop_sequence,
            },
            TaskType::Abstract => PromptTemplate {
                header: "### Instruction:",
                instruction: format!("{ABSTRACTION_GUIDELINES}{stop_sequence}"),
                input_marker: "### Input:",
                output_marker: "### Output:\n<|ABSTRACTIE_START|>",
                stop_sequence,
            },
            TaskType::Translate => {
                let language = match metadata.target_language.as_deref() {
                    Some(language) if !language.trim().is_empty() => language,
                    _ => {
                        tracing::debug!("No target language given, translating to {FALLBACK_LANGUAGE}");
                        FALLBACK_LANGUAGE
                    }
                };
                PromptTemplate {
                    header: "### INSTRUCTIE",
                    instruction: format!(
                        "Vertaal deze Nederlandse medische tekst naar de volgende taal: {language}. \
                         Geef alleen de vertaling, zonder uitleg.\n\
                         Sluit je output af met exact de volgende woorden: {stop_sequence}"
                    ),
                    input_marker: "### Tekst:\n",
                    output_marker: "### Vertaling:",
                    stop_sequence,
                }
            }
            TaskType::Custom => PromptTemplate {
                header: "### INSTRUCTIE",
                instruction: format!(
                    "Gebruik de volgende context: {}\nZoekwoorden: {}\n\
                     Sluit je output af met exact de volgende woorden: {stop_sequence}",
                    metadata.context.as_deref().unwrap_or_default(),
                    metadata.keywords.join(", ")
                ),
                input_marker: "Tekst:\n",
                output_marker: "### Output:",
                stop_sequence,
            },
            TaskType::Default => PromptTemplate {
                header: "### INSTRUCTIE",
                instruction: format!(
                    "Behandel deze tekst volgens een standaardprocedure.\n\
                     Sluit je output af met exact de volgende woorden: {stop_sequence}"
                ),
                input_marker: "",
                output_marker: "### Reactie:",
                stop_sequence,
            },
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Summarize => write!(f, "summarize"),
            TaskType::Abstract => write!(f, "abstract"),
            TaskType::Translate => write!(f, "translate"),
            TaskType::Custom => write!(f, "custom"),
            TaskType::Default => write!(f, "default"),
        }
    }
}

/// Caller-supplied values some templates interpolate besides the raw text.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PromptMetadata {
    pub target_language: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub header: &'static str,
    pub instruction: String,
    pub input_marker: &'static str,
    pub output_marker: &'static str,
    pub stop_sequence: &'static str,
}

impl PromptTemplate {
    pub fn render(&self, text: &str) -> String {
        format!(
            "{}\n{}\n\n{}{}\n\n{}\n",
            self.header, self.instruction, self.input_marker, text, self.output_marker
        )
    }
}

/// Builds the full prompt for `text`. Empty text is accepted; input validation belongs to the handlers.
#[tracing::instrument(level = "debug", skip(text, metadata), fields(text_len = text.len()))]
pub fn build_prompt(text: &str, task: TaskType, metadata: &PromptMetadata) -> String {
    let prompt = task.template(metadata).render(text);
    tracing::trace!(%prompt, "Built prompt");
    prompt
}
