/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MkStatus {
    Ok = 0,
    /// A null buffer pointer was passed.
    ErrorInvalidArgument = 1,
    /// Dimensions or alignment violate the operation's contract.
    ErrorContract = 2,
    ErrorInternal = 3,
}
