use crate::bus::Bus;
use crate::outcome::Outcome;
use async_trait::async_trait;

/// One typed step of a circuit.
///
/// `Transition` converts state `From` into `Outcome<To, Error>`. Resources are
/// read from the [`Bus`].
#[async_trait]
pub trait Transition<From, To>: Send + Sync + 'static
where
    From: Send + 'static,
    To: Send + 'static,
{
    /// Domain-specific error type
    type Error: Send + Sync + 'static;

    /// Name shown in the schematic and in trace spans. Defaults to the type name.
    fn label(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.split("::").last().unwrap_or(full).to_string()
    }

    fn description(&self) -> Option<String> {
        None
    }

    async fn run(&self, state: From, bus: &mut Bus) -> Outcome<To, Self::Error>;
}
