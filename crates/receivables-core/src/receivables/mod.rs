pub mod distribution;
pub mod input;
pub mod simulation;

pub use distribution::{
    parse_plan_text, InstallmentPlanDistribution, LineError, LineErrorReason, ParsedPlan,
    PlanWeight,
};
pub use input::{run_simulation, DistributionInput, EventTiming, SimulationInput, SimulationRun};
pub use simulation::{
    simulate, InstallmentRecord, ReceiptKind, SimulationParameters, SimulationResult,
};
