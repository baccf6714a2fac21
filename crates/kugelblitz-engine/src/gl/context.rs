use std::cell::Cell;

use thiserror::Error;

use super::backend::GlBackend;

/// Driver errors drained after an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("GL error(s) after {operation}: {}", format_codes(.codes))]
pub struct GlError {
    pub operation: String,
    pub codes: Vec<u32>,
}

fn format_codes(codes: &[u32]) -> String {
    codes
        .iter()
        .map(|c| format!("0x{c:04X}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// glGetError never reports more distinct flags than this; the cap guards against
// a broken driver that never clears its flag.
const MAX_PENDING_ERRORS: usize = 16;

/// A GL backend plus the context's current-program slot.
///
/// Every activation must go through [`Gl::use_program`] so the slot mirrors the
/// driver. There is exactly one current program per context; the last
/// activation wins.
pub struct Gl<B: GlBackend = glow::Context> {
    api: B,
    current_program: Cell<Option<B::Program>>,
}

impl<B: GlBackend> Gl<B> {
    pub fn new(api: B) -> Self {
        Self {
            api,
            current_program: Cell::new(None),
        }
    }

    /// Raw backend access. Crate-private so the current-program slot cannot be
    /// bypassed with a direct `use_program`.
    pub(crate) fn api(&self) -> &B {
        &self.api
    }

    pub fn current_program(&self) -> Option<B::Program> {
        self.current_program.get()
    }

    pub fn use_program(&self, program: Option<B::Program>) {
        self.api.use_program(program);
        self.current_program.set(program);
    }

    /// Drains the driver error queue; `Err` lists every pending code.
    pub fn check_error(&self, operation: &str) -> Result<(), GlError> {
        let codes: Vec<u32> = std::iter::from_fn(|| self.api.take_error())
            .take(MAX_PENDING_ERRORS)
            .collect();

        if codes.is_empty() {
            Ok(())
        } else {
            Err(GlError {
                operation: operation.to_string(),
                codes,
            })
        }
    }
}
