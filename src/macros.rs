/// True if bit `$bit` of `$value` is set
macro_rules! bit_bool {
    ($value:expr, $bit:expr) => {
        (($value >> $bit) & 0x1) != 0
    };
}

/// Unwraps an SDL result, turning its `String` error into an `eyre` report
macro_rules! fw_error {
    ($result:expr) => {
        $result.map_err(|e| eyre::eyre!("{}", e))?
    };
}

pub(crate) use bit_bool;
pub(crate) use fw_error;
