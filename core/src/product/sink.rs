use crate::prelude::ProductOutput;

/// Receives step outputs for rendering or writing.
pub trait ProductSink {
    type Error: std::error::Error;

    fn export(&mut self, step: &str, output: &ProductOutput) -> Result<(), Self::Error>;
}

/// Keeps every exported product in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub products: Vec<(String, ProductOutput)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductSink for MemorySink {
    type Error = std::convert::Infallible;

    fn export(&mut self, step: &str, output: &ProductOutput) -> Result<(), Self::Error> {
        self.products.push((step.to_string(), output.clone()));
        Ok(())
    }
}
