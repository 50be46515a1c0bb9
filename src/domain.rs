//! Domain models: factoring cases, language selector, and the three result shapes.

use serde::{Deserialize, Serialize};

/// The factoring techniques the tutor knows about, plus auto-detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoringCase {
  /// Ask the model to determine which case (if any) applies.
  AutoDetect,
  CommonFactor,
  DifferenceOfSquares,
  PerfectSquareTrinomial,
  TrinomialX2BxC,
}

impl Default for FactoringCase {
  fn default() -> Self { FactoringCase::AutoDetect }
}

impl FactoringCase {
  /// Display label in the requested language.
  pub fn label(&self, lang: Language) -> &'static str {
    match (self, lang) {
      (FactoringCase::AutoDetect, Language::Es) => "Autodetectar",
      (FactoringCase::AutoDetect, Language::En) => "Auto-detect",
      (FactoringCase::CommonFactor, Language::Es) => "Factor Común",
      (FactoringCase::CommonFactor, Language::En) => "Common Factor",
      (FactoringCase::DifferenceOfSquares, Language::Es) => "Diferencia de Cuadrados",
      (FactoringCase::DifferenceOfSquares, Language::En) => "Difference of Squares",
      (FactoringCase::PerfectSquareTrinomial, Language::Es) => "Trinomio Cuadrado Perfecto",
      (FactoringCase::PerfectSquareTrinomial, Language::En) => "Perfect Square Trinomial",
      (FactoringCase::TrinomialX2BxC, Language::Es) => "Trinomio de la forma x² + bx + c",
      (FactoringCase::TrinomialX2BxC, Language::En) => "Trinomial x² + bx + c",
    }
  }

  /// Label embedded into prompt text. Prompts are written in Spanish;
  /// the model answers in the requested language via the instruction line.
  pub fn prompt_label(&self) -> &'static str {
    self.label(Language::Es)
  }

  /// The four concrete techniques; AutoDetect is a mode, not a method.
  pub fn specific_cases() -> [FactoringCase; 4] {
    [
      FactoringCase::CommonFactor,
      FactoringCase::DifferenceOfSquares,
      FactoringCase::PerfectSquareTrinomial,
      FactoringCase::TrinomialX2BxC,
    ]
  }
}

/// UI language selector. Affects prompt instructions and localized strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
  #[serde(rename = "es")]
  Es,
  #[serde(rename = "en")]
  En,
}

impl Default for Language {
  fn default() -> Self { Language::Es }
}

impl Language {
  /// Instruction line for analysis prompts (the whole answer must switch).
  pub fn instruction_all(&self) -> &'static str {
    match self {
      Language::Es => "Responde TODO en Español.",
      Language::En => "Respond EVERYTHING in English.",
    }
  }

  /// Instruction line for example/context prompts.
  pub fn instruction(&self) -> &'static str {
    match self {
      Language::Es => "Responde en Español.",
      Language::En => "Respond in English.",
    }
  }
}

/// One entry in the ordered solution sequence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Step {
  pub title: String,
  pub description: String,
}

/// Full analysis of one expression.
///
/// When `is_valid` is false, `steps` may be empty and `factored_result` is
/// not meaningful; `method_explanation` is then the sole content to show.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
  pub case_label: String,
  pub is_valid: bool,
  pub steps: Vec<Step>,
  pub factored_result: String,
  pub method_explanation: String,
}

/// A practice exercise with its factored solution.
/// `case_label` comes from the local label table, never from the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeExample {
  pub problem: String,
  pub solution: String,
  pub case_label: String,
}

/// A short trivia fact. Regenerated on demand; no identity across requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MathContextFact {
  pub title: String,
  pub content: String,
}
