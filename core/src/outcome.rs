use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type BranchId = String;

/// The explicit result of one step in a circuit.
///
/// Instead of early returns or panics, every step reports how the run should
/// continue: carry on with a new state, leave the main path on a named branch
/// (a business outcome such as `empty_cart`), or stop on a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome<T, E> {
    /// Proceed to the next step
    Next(T),

    /// Leave the main path on a named branch, with an optional JSON payload
    Branch(BranchId, Option<Value>),

    /// A fault (error path)
    Fault(E),
}

impl<T, E> Outcome<T, E> {
    pub fn next(value: T) -> Self {
        Outcome::Next(value)
    }

    pub fn branch(id: impl Into<BranchId>, payload: Option<Value>) -> Self {
        Outcome::Branch(id.into(), payload)
    }

    pub fn fault(error: E) -> Self {
        Outcome::Fault(error)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> Outcome<U, E> {
        match self {
            Outcome::Next(t) => Outcome::Next(op(t)),
            Outcome::Branch(id, payload) => Outcome::Branch(id, payload),
            Outcome::Fault(e) => Outcome::Fault(e),
        }
    }

    pub fn map_fault<F2, Op: FnOnce(E) -> F2>(self, op: Op) -> Outcome<T, F2> {
        match self {
            Outcome::Next(t) => Outcome::Next(t),
            Outcome::Branch(id, payload) => Outcome::Branch(id, payload),
            Outcome::Fault(e) => Outcome::Fault(op(e)),
        }
    }

    pub fn is_next(&self) -> bool {
        matches!(self, Outcome::Next(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Outcome::Fault(_))
    }

    pub fn into_next(self) -> Option<T> {
        match self {
            Outcome::Next(t) => Some(t),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Next(_) => "Next",
            Outcome::Branch(..) => "Branch",
            Outcome::Fault(_) => "Fault",
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(t) => Outcome::Next(t),
            Err(e) => Outcome::Fault(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_branches_and_faults() {
        let next: Outcome<u32, String> = Outcome::next(2);
        assert_eq!(next.map(|n| n * 10), Outcome::Next(20));

        let branch: Outcome<u32, String> = Outcome::branch("empty_cart", None);
        assert_eq!(branch.map(|n| n * 10).kind(), "Branch");

        let fault: Outcome<u32, String> = Outcome::fault("boom".into());
        assert_eq!(fault.map_fault(|e| e.len()), Outcome::Fault(4));
    }

    #[test]
    fn test_from_result() {
        let ok: Outcome<u8, &str> = Ok(1).into();
        let err: Outcome<u8, &str> = Err("no").into();
        assert!(ok.is_next());
        assert!(err.is_fault());
    }
}
