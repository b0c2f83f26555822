//! Knockout bracket: symbolic positions, the bracket definition, third-place
//! slot assignment and resolution of positions into teams.

pub mod bracket;
pub mod reference;
pub mod resolver;
pub mod slots;
pub mod stage;


pub use bracket::{BracketDefinition, BracketNode, Round};
pub use reference::{GroupPlace, Outcome, PositionReference};
pub use resolver::{BracketResolver, NodeState, Resolution, ResolvedFixture};
pub use slots::{SlotAssigner, SlotAssignment, SlotConstraint, SlotPick};
pub use stage::{AssignmentDrift, FrozenAssignment, KnockoutStage, NewFixture};
