pub mod analyst;

pub use analyst::NakedForexAnalyst;

pub trait Agent {
    fn name(&self) -> &str;
    fn system_prompt(&self) -> &str;

    /// System prompt extended with a task-specific instruction line
    fn system_prompt_with(&self, addendum: &str) -> String {
        format!("{}\n{}", self.system_prompt(), addendum)
    }
}
