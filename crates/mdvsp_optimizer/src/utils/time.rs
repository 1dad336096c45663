/// Runs `$block`, logs its wall-clock duration at debug level and returns
/// `(result, elapsed)`.
#[macro_export]
macro_rules! timer_debug {
    ($msg:literal, $block:expr) => {{
        let start = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(start);

        tracing::debug!("{}: took {:?}", $msg, elapsed);

        (result, elapsed)
    }};
}
