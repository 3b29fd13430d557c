/*!

# Overview

Leveled, threshold-filtered logging on top of `tracing`. The log level describes what _kind_ of message is logged,
and the numeric threshold is a verbosity level. A message is emitted only if its threshold is at most the global
threshold, so low numbers mean "important" and high numbers mean "chatty".

```
use elab_order::log::*;

set_global_logging_threshold(1);

info!(1, "ordering batch of {} definitions", 3); // Emitted
debug!(3, "completion step");                   // Not emitted
warning!("no threshold means threshold 0");     // Always emitted
```

The scheduler logs at these thresholds:

| threshold | what                                                         |
|:----------|:-------------------------------------------------------------|
| 0         | never used by the library; reserved for the embedding program |
| 1         | batch start/end, rollback, completion explosions              |
| 2         | unit and cycle events, termination verdicts                   |
| 3         | call extraction and completion progress                       |
| 4         | individual call matrices                                      |

## Levels

Available levels are:  Critical, Error, Warning, Info, Debug, Trace. Messages of a particular level are prefixed with
the (color coded) level name.

syntax:

```ignore
// With threshold
level!(threshold, "format string", args...);

// Without threshold (indicates threshold of 0, always emitted). A format string with arguments
// must be given an explicit threshold, since the macro cannot tell a format string from a threshold.
level!("message");
```

The logger initializes itself on first use. If the embedding program has already installed a global `tracing`
subscriber, that subscriber is left in place and receives the events instead.

*/
mod formatter;
mod threshold_filter;
mod macros;

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::Lazy;
use tracing_subscriber::{
  fmt,
  layer::SubscriberExt,
  Registry
};

use threshold_filter::ThresholdFilterLayer;
use formatter::CustomFieldFormatter;
pub use macros::*;

/// Used for implicit initialization.
static INIT_LOGGER: Lazy<()> = Lazy::new(|| {
  let subscriber = Registry::default()
      .with(ThresholdFilterLayer)
      .with(
        fmt::layer()
            .fmt_fields(CustomFieldFormatter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stdout),
      );

  // Fails only when another global subscriber is already installed, in which case we defer to it.
  let _ = tracing::subscriber::set_global_default(subscriber);
});

/// This does not need to be called directly. Initializes the logging system.
pub fn init_logger() {
  Lazy::force(&INIT_LOGGER);
}

/// Default verbosity. Batch-level and per-group events are visible, per-matrix chatter is not.
pub const DEFAULT_LOGGING_THRESHOLD: u8 = 3;

static GLOBAL_LOGGING_THRESHOLD: AtomicU8 = AtomicU8::new(DEFAULT_LOGGING_THRESHOLD);

/// Sets the global threshold. Takes effect for every subsequent event.
pub fn set_global_logging_threshold(new_threshold: u8) {
  GLOBAL_LOGGING_THRESHOLD.store(new_threshold, Ordering::SeqCst);
}

/// Retrieves the global threshold.
pub fn get_global_logging_threshold() -> u8 {
  GLOBAL_LOGGING_THRESHOLD.load(Ordering::SeqCst)
}
