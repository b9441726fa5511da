use crate::ast::Module;

/// Context passed to rules during analysis
pub struct AnalysisContext<'a> {
    pub module: &'a Module,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(module: &'a Module) -> Self {
        Self { module }
    }
}
