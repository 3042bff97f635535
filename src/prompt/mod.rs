// Prompt shaping: inbound request model, content-part assembly, the fixed
// generation policy and the single-call dispatcher.

pub mod assembler;
pub mod dispatcher;
pub mod parts;
pub mod policy;
pub mod request;

pub use assembler::{assemble, REFERENCE_MARKER, SELFIE_MARKER, USER_REQUEST_LABEL};
pub use dispatcher::{Dispatcher, RequestPhase};
pub use parts::ContentPart;
pub use policy::{GenerationPolicy, PROMPTRAITS_SYSTEM_INSTRUCTION};
pub use request::{ImageInput, PromptRequest, PromptRequestBody};
