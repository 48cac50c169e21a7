//! # Axon
//!
//! A reusable, typed chain of [`Transition`]s.
//!
//! The `Axon` runs a circuit; its [`Schematic`] describes it. Both are built
//! together by `Axon::new(label).then(step).then(step)`, so the schematic can
//! never drift from what actually executes.

use mesa_core::bus::Bus;
use mesa_core::outcome::Outcome;
use mesa_core::schematic::{Edge, Node, NodeKind, Schematic};
use mesa_core::transition::Transition;
use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Composed step function: input state plus the run's Bus to an outcome.
pub type Executor<In, Out, E> =
    Arc<dyn for<'a> Fn(In, &'a mut Bus) -> BoxFuture<'a, Outcome<Out, E>> + Send + Sync>;

fn short_type_name<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

pub struct Axon<In, Out, E> {
    schematic: Schematic,
    executor: Executor<In, Out, E>,
}

impl<In, Out, E> Clone for Axon<In, Out, E> {
    fn clone(&self) -> Self {
        Self {
            schematic: self.schematic.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<In, E> Axon<In, In, E>
where
    In: Send + Sync + 'static,
    E: Send + 'static,
{
    /// Identity circuit (`In -> In`) named `label`.
    pub fn new(label: &str) -> Self {
        let mut schematic = Schematic::new(label);
        schematic.nodes.push(Node {
            id: uuid::Uuid::new_v4().to_string(),
            kind: NodeKind::Ingress,
            label: label.to_string(),
            input_type: "void".to_string(),
            output_type: short_type_name::<In>(),
            description: None,
        });

        let executor: Executor<In, In, E> = Arc::new(
            move |input: In, _bus: &mut Bus| -> BoxFuture<'_, Outcome<In, E>> {
                Box::pin(std::future::ready(Outcome::Next(input)))
            },
        );

        Self {
            schematic,
            executor,
        }
    }
}

impl<In, Out, E> Axon<In, Out, E>
where
    In: Send + Sync + 'static,
    Out: Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.schematic.description = Some(description.into());
        self
    }

    /// Appends a step. `Branch` and `Fault` from earlier steps skip it.
    pub fn then<Next, Step>(self, step: Step) -> Axon<In, Next, E>
    where
        Next: Send + Sync + 'static,
        Step: Transition<Out, Next, Error = E> + Clone,
    {
        let label = step.label();
        let Axon {
            mut schematic,
            executor: prev,
        } = self;

        let node_id = uuid::Uuid::new_v4().to_string();
        let from = schematic
            .nodes
            .last()
            .map(|n| n.id.clone())
            .unwrap_or_default();
        schematic.nodes.push(Node {
            id: node_id.clone(),
            kind: NodeKind::Atom,
            label: label.clone(),
            input_type: short_type_name::<Out>(),
            output_type: short_type_name::<Next>(),
            description: step.description(),
        });
        schematic.edges.push(Edge {
            from,
            to: node_id,
            label: Some("Next".to_string()),
        });

        let executor: Executor<In, Next, E> = Arc::new(
            move |input: In, bus: &mut Bus| -> BoxFuture<'_, Outcome<Next, E>> {
                let prev = prev.clone();
                let step = step.clone();
                let label = label.clone();

                Box::pin(async move {
                    let state = match prev(input, bus).await {
                        Outcome::Next(state) => state,
                        Outcome::Branch(id, payload) => return Outcome::Branch(id, payload),
                        Outcome::Fault(e) => return Outcome::Fault(e),
                    };

                    let span = tracing::info_span!("Node", mesa.node = %label);
                    async move {
                        let outcome = step.run(state, bus).await;
                        tracing::debug!(outcome = outcome.kind(), "step finished");
                        outcome
                    }
                    .instrument(span)
                    .await
                })
            },
        );

        Axon {
            schematic,
            executor,
        }
    }

    pub async fn execute(&self, input: In, bus: &mut Bus) -> Outcome<Out, E> {
        let span = tracing::info_span!("Circuit", mesa.circuit = %self.schematic.name);
        async move {
            let outcome = (self.executor)(input, bus).await;
            if let Outcome::Branch(id, _) = &outcome {
                tracing::info!(branch = %id, "circuit left the main path");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone)]
    struct Double;

    #[async_trait]
    impl Transition<u32, u32> for Double {
        type Error = String;

        async fn run(&self, state: u32, _bus: &mut Bus) -> Outcome<u32, String> {
            Outcome::Next(state * 2)
        }
    }

    #[derive(Clone)]
    struct RejectZero;

    #[async_trait]
    impl Transition<u32, String> for RejectZero {
        type Error = String;

        fn label(&self) -> String {
            "RejectZero".into()
        }

        async fn run(&self, state: u32, bus: &mut Bus) -> Outcome<String, String> {
            if let Some(calls) = bus.get_mut::<u32>() {
                *calls += 1;
            }
            if state == 0 {
                return Outcome::branch("zero", None);
            }
            Outcome::Next(format!("n={state}"))
        }
    }

    #[derive(Clone)]
    struct Explode;

    #[async_trait]
    impl Transition<u32, u32> for Explode {
        type Error = String;

        async fn run(&self, _state: u32, _bus: &mut Bus) -> Outcome<u32, String> {
            Outcome::Fault("boom".into())
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let axon = Axon::<u32, u32, String>::new("Math")
            .then(Double)
            .then(Double)
            .then(RejectZero);
        let mut bus = Bus::new().with(0u32);

        assert_eq!(axon.execute(3, &mut bus).await, Outcome::Next("n=12".into()));
        assert_eq!(bus.get::<u32>(), Some(&1));
    }

    #[tokio::test]
    async fn test_branch_and_fault_short_circuit() {
        let branching = Axon::<u32, u32, String>::new("Branching")
            .then(RejectZero)
            .then(Explode2);
        let mut bus = Bus::new();
        assert_eq!(
            branching.execute(0, &mut bus).await,
            Outcome::Branch("zero".into(), None)
        );

        let faulting = Axon::<u32, u32, String>::new("Faulting")
            .then(Explode)
            .then(Double);
        assert_eq!(faulting.execute(5, &mut bus).await, Outcome::Fault("boom".into()));
    }

    #[derive(Clone)]
    struct Explode2;

    #[async_trait]
    impl Transition<String, String> for Explode2 {
        type Error = String;

        async fn run(&self, _state: String, _bus: &mut Bus) -> Outcome<String, String> {
            Outcome::Fault("unreachable".into())
        }
    }

    #[test]
    fn test_schematic_mirrors_the_chain() {
        let axon = Axon::<u32, u32, String>::new("Math")
            .then(Double)
            .then(RejectZero);
        let schematic = axon.schematic();

        assert_eq!(schematic.labels(), ["Math", "Double", "RejectZero"]);
        assert_eq!(schematic.nodes[0].kind, NodeKind::Ingress);
        assert_eq!(schematic.edges.len(), 2);
        assert_eq!(schematic.edges[1].from, schematic.nodes[1].id);
        assert_eq!(schematic.nodes[2].output_type, "String");
    }
}
