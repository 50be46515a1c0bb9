//! Built-in content: the trivia topic list and the fallback context fact.

use crate::domain::{Language, MathContextFact};

/// Default pool of math-history/culture topics for trivia generation.
/// A topic is picked uniformly at random per request to ensure variety.
pub fn default_context_topics() -> Vec<String> {
  [
    "Ancient Babylonian or Egyptian mathematics",
    "Modern cryptography and prime numbers",
    "The Golden Ratio or Fibonacci sequence in nature",
    "Women in mathematics history (e.g., Hypatia, Ada Lovelace, Emmy Noether)",
    "Unsolved mathematical problems or paradoxes",
    "The origin of mathematical symbols (like x, =, zero)",
    "Fractals and Chaos Theory",
    "Math in architecture or art",
    "Strange properties of specific numbers (like Pi, e, or imaginary numbers)",
    "The use of polynomials in computer graphics",
  ]
  .into_iter()
  .map(str::to_string)
  .collect()
}

/// Fixed fact served whenever trivia generation fails.
/// The only place where a generation failure is absorbed instead of surfaced.
pub fn fallback_context_fact(lang: Language) -> MathContextFact {
  match lang {
    Language::Es => MathContextFact {
      title: "¿Sabías que?".into(),
      content: "El álgebra proviene de la palabra árabe 'al-jabr', que significa 'reunión de partes rotas'. Es fundamental para resolver problemas en ingeniería, física y economía.".into(),
    },
    Language::En => MathContextFact {
      title: "Did you know?".into(),
      content: "Algebra comes from the Arabic word 'al-jabr', meaning 'reunion of broken parts'. It is fundamental for solving problems in engineering, physics, and economics.".into(),
    },
  }
}
