//! Topic topology: one graph node per line of inquiry.
//!
//! Each assistant turn either opens a new node or reinforces the latest one.
//! The sequence is append-only; weights only grow.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Horizontal offset range for a new node, relative to its predecessor.
pub const OFFSET_X_SPREAD: f64 = 40.0;
/// Minimum vertical step between consecutive nodes.
pub const OFFSET_Y_BASE: f64 = 60.0;
/// Additional random vertical step, sampled in `[0, OFFSET_Y_JITTER)`.
pub const OFFSET_Y_JITTER: f64 = 40.0;

/// Source of layout randomness.
///
/// Every `rand::Rng` qualifies; tests can pin offsets with a scripted source.
pub trait LayoutRng {
    /// Uniform sample in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng + ?Sized> LayoutRng for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.gen_range(low..high)
    }
}

/// A topic node in the conversation graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Id of the user message that opened the topic.
    pub id: u64,
    /// Message this node points back to (click-to-scroll, highlighting).
    pub message_id: u64,
    /// Number of turns spent on this topic.
    pub weight: u32,
    /// Displacement from the previous node; unused for the first node.
    pub offset_x: f64,
    /// Always positive: the graph grows downward.
    pub offset_y: f64,
}

impl GraphNode {
    /// Circle radius used by both rendering and hit-testing
    pub fn radius(&self) -> f64 {
        6.0 + f64::from(self.weight.saturating_sub(1)) * 2.0
    }
}

/// What a turn did to the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A new node was appended at this index.
    NewNode(usize),
    /// The node at this index gained weight.
    Reinforced(usize),
}

/// Ordered, append-only sequence of topic nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyModel {
    nodes: Vec<GraphNode>,
}

impl TopologyModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one assistant turn's topic signal into the model.
    ///
    /// The first turn always opens a node, whatever the classifier said.
    pub fn apply_turn<R>(&mut self, user_message_id: u64, is_new_topic: bool, rng: &mut R) -> TurnOutcome
    where
        R: LayoutRng + ?Sized,
    {
        if is_new_topic || self.nodes.is_empty() {
            let node = GraphNode {
                id: user_message_id,
                message_id: user_message_id,
                weight: 1,
                offset_x: rng.uniform(-OFFSET_X_SPREAD, OFFSET_X_SPREAD),
                offset_y: OFFSET_Y_BASE + rng.uniform(0.0, OFFSET_Y_JITTER),
            };
            debug!(
                node_id = node.id,
                index = self.nodes.len(),
                "Opened topic node"
            );
            self.nodes.push(node);
            return TurnOutcome::NewNode(self.nodes.len() - 1);
        }

        let index = self.nodes.len() - 1;
        // Non-empty: checked above.
        if let Some(last) = self.nodes.last_mut() {
            last.weight += 1;
            debug!(node_id = last.id, weight = last.weight, "Reinforced topic node");
        }
        TurnOutcome::Reinforced(index)
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Most recently created node
    pub fn latest(&self) -> Option<&GraphNode> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Replays fixed samples (as fractions of the requested range).
    pub(crate) struct ScriptedRng(pub VecDeque<f64>);

    impl LayoutRng for ScriptedRng {
        fn uniform(&mut self, low: f64, high: f64) -> f64 {
            let t = self.0.pop_front().unwrap_or(0.5);
            low + (high - low) * t
        }
    }

    #[test]
    fn test_first_turn_always_creates_node() {
        let mut model = TopologyModel::new();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = model.apply_turn(100, false, &mut rng);

        assert_eq!(outcome, TurnOutcome::NewNode(0));
        assert_eq!(model.len(), 1);
        let node = &model.nodes()[0];
        assert_eq!(node.id, 100);
        assert_eq!(node.message_id, 100);
        assert_eq!(node.weight, 1);
    }

    #[test]
    fn test_continuing_turns_accumulate_weight() {
        let mut model = TopologyModel::new();
        let mut rng = StdRng::seed_from_u64(2);
        model.apply_turn(1, true, &mut rng);
        for k in 1..=5u32 {
            let outcome = model.apply_turn(10 + u64::from(k), false, &mut rng);
            assert_eq!(outcome, TurnOutcome::Reinforced(0));
            assert_eq!(model.nodes()[0].weight, 1 + k);
        }
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_new_topic_appends_and_leaves_previous_untouched() {
        let mut model = TopologyModel::new();
        let mut rng = StdRng::seed_from_u64(3);
        model.apply_turn(1, true, &mut rng);
        model.apply_turn(2, false, &mut rng);
        let before = model.nodes()[0].clone();

        let outcome = model.apply_turn(3, true, &mut rng);
        assert_eq!(outcome, TurnOutcome::NewNode(1));
        assert_eq!(model.nodes()[0], before);
        assert_eq!(model.latest().map(|n| n.id), Some(3));
        assert_eq!(model.latest().map(|n| n.weight), Some(1));
    }

    #[test]
    fn test_length_never_shrinks() {
        let mut model = TopologyModel::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut previous = 0;
        for i in 0..200u64 {
            model.apply_turn(i, i % 3 == 0 || i % 7 == 0, &mut rng);
            assert!(model.len() >= previous);
            previous = model.len();
        }
    }

    #[test]
    fn test_offsets_stay_in_range() {
        let mut model = TopologyModel::new();
        let mut rng = StdRng::seed_from_u64(5);
        for i in 0..500u64 {
            model.apply_turn(i, true, &mut rng);
        }
        for node in model.nodes() {
            assert!((-40.0..40.0).contains(&node.offset_x));
            assert!((60.0..100.0).contains(&node.offset_y));
            assert!(node.offset_y > 0.0);
        }
    }

    #[test]
    fn test_scripted_offsets() {
        let mut model = TopologyModel::new();
        let mut rng = ScriptedRng(VecDeque::from(vec![0.0, 1.0]));
        model.apply_turn(7, true, &mut rng);
        let node = &model.nodes()[0];
        assert_eq!(node.offset_x, -40.0);
        assert_eq!(node.offset_y, 100.0);
    }

    #[test]
    fn test_radius_grows_with_weight() {
        let mut node = GraphNode {
            id: 1,
            message_id: 1,
            weight: 1,
            offset_x: 0.0,
            offset_y: 60.0,
        };
        assert_eq!(node.radius(), 6.0);
        node.weight = 4;
        assert_eq!(node.radius(), 12.0);
    }
}
