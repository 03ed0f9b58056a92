use std::fmt::{Debug, Formatter};

enum Token {
    Literal(String),
    Dynamic(Box<dyn Fn() -> String>),
}

/// Render-on-demand string assembler.
///
/// Tokens are either fixed strings or callbacks re-evaluated at every
/// render, so a label can track the latest state of the objects it
/// mentions without anyone pushing updates into it.
#[derive(Default)]
pub struct LiveText {
    tokens: Vec<Token>,
}

impl LiveText {
    /// Creates an empty live text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fixed string token.
    pub fn add_literal(&mut self, text: impl Into<String>) {
        self.tokens.push(Token::Literal(text.into()));
    }

    /// Appends a callback token re-evaluated at every render.
    pub fn add_dynamic(&mut self, render: impl Fn() -> String + 'static) {
        self.tokens.push(Token::Dynamic(Box::new(render)));
    }

    /// Returns the number of tokens added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether no tokens were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Renders the text with every callback's current value.
    #[must_use]
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Literal(text) => text.clone(),
                Token::Dynamic(render) => render(),
            })
            .collect()
    }
}

impl Debug for LiveText {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LiveText")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}
