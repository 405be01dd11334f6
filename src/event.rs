//! The counting event published by producers.

use serde::{Deserialize, Serialize};

/// A counter update reported by a producer.
///
/// Every string field is optional; a missing `valorAtual` decodes as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContagemEvent {
    #[serde(default)]
    pub valor_atual: i64,
    pub producer: Option<String>,
    pub kernel: Option<String>,
    pub framework: Option<String>,
    pub mensagem: Option<String>,
}

impl ContagemEvent {
    /// Renders all five fields on one line, absent strings as empty.
    pub fn summary(&self) -> String {
        format!(
            "Valor atual: {} | Producer: {} | Kernel: {} | Framework: {} | Mensagem: {}",
            self.valor_atual,
            self.producer.as_deref().unwrap_or_default(),
            self.kernel.as_deref().unwrap_or_default(),
            self.framework.as_deref().unwrap_or_default(),
            self.mensagem.as_deref().unwrap_or_default(),
        )
    }
}
