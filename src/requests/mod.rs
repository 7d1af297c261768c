pub mod split_swap_request;
pub mod swap_request;

pub use split_swap_request::{SplitSwapRequest, SwapInAmountMapping, SwapOutAmountMapping};
pub use swap_request::SwapRequest;
