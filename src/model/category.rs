use serde::{Deserialize, Serialize};

/// The expense category derived from a ledger line's history text.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Bolsa Ensino")]
    BolsaEnsino,
    #[serde(rename = "Bolsa/Coordenação")]
    BolsaCoordenacao,
    #[serde(rename = "Bolsas")]
    Bolsas,
    #[serde(rename = "Atividade")]
    Atividade,
    #[default]
    #[serde(rename = "Outros")]
    Outros,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Classifies `text` by keyword. Matching is case-insensitive and the first rule that matches
    /// wins, in this order: teaching/interpreter grants, coordination grants, any other grant,
    /// activity, everything else.
    pub fn classify(text: &str) -> Category {
        let upper = text.to_uppercase();
        let has = |needle: &str| upper.contains(needle);

        if has("BOLSA ENSINO") || has("BOLSA/ENSINO") || has("INTERPRETE") || has("INTÉRPRETE") {
            Category::BolsaEnsino
        } else if is_coordination_grant(&upper) {
            Category::BolsaCoordenacao
        } else if has("BOLSA") {
            Category::Bolsas
        } else if has("ATIVIDADE") {
            Category::Atividade
        } else {
            Category::Outros
        }
    }
}

/// Matches "BOLSA COORDENAÇÃO", "BOLSA/COORDENAÇÃO" and their unaccented spellings.
fn is_coordination_grant(upper: &str) -> bool {
    ["BOLSA COORDENA", "BOLSA/COORDENA", "BOLSA / COORDENA"]
        .iter()
        .any(|prefix| upper.contains(prefix))
}
