// Client-side batched upload core

pub mod encoder;
pub mod ledger;
pub mod orchestrator;
pub mod recovery;
pub mod selection;

pub use encoder::EncodedImage;
pub use ledger::{LedgerEntry, Outcome, Progress, SendSession};
pub use orchestrator::Orchestrator;
pub use recovery::{recover, Recovery};
pub use selection::{
    AddOutcome, CapWarning, FileSource, PreviewHandle, PreviewProvider, PreviewRegistry,
    SelectedFile, SelectionManager,
};
