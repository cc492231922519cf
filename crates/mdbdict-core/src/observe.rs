//! Optional metrics instrumentation for mdbdict.
//!
//! When the `observe` feature is enabled, dictionary operations emit counters
//! and histograms via the [`metrics`] crate. A downstream application must
//! install a metrics recorder to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

/// Record a lookup.
///
/// - `mdbdict.lookup.total` – counter with `result` label (`hit` / `miss`)
#[inline]
pub fn record_lookup(hit: bool) {
    #[cfg(feature = "observe")]
    {
        let result = if hit { "hit" } else { "miss" };
        metrics::counter!("mdbdict.lookup.total", "result" => result).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = hit;
    }
}

/// Record an update.
///
/// - `mdbdict.update.total` – counter with `outcome` label (`stored` / `duplicate`)
#[inline]
pub fn record_update(duplicate: bool) {
    #[cfg(feature = "observe")]
    {
        let outcome = if duplicate { "duplicate" } else { "stored" };
        metrics::counter!("mdbdict.update.total", "outcome" => outcome).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = duplicate;
    }
}

/// Record a delete.
///
/// - `mdbdict.delete.total` – counter with `result` label (`found` / `missing`)
#[inline]
pub fn record_delete(found: bool) {
    #[cfg(feature = "observe")]
    {
        let result = if found { "found" } else { "missing" };
        metrics::counter!("mdbdict.delete.total", "result" => result).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = found;
    }
}

/// Record a private transaction commit (counter + latency histogram).
///
/// - `mdbdict.transaction.commits_total`
/// - `mdbdict.transaction.commit_duration_seconds`
#[inline]
pub fn record_commit(duration: std::time::Duration) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("mdbdict.transaction.commits_total").increment(1);
        metrics::histogram!("mdbdict.transaction.commit_duration_seconds")
            .record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = duration;
    }
}

/// Record one traversal step.
///
/// - `mdbdict.sequence.steps_total` – counter with `result` label (`entry` / `end`)
#[inline]
pub fn record_sequence_step(end: bool) {
    #[cfg(feature = "observe")]
    {
        let result = if end { "end" } else { "entry" };
        metrics::counter!("mdbdict.sequence.steps_total", "result" => result).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = end;
    }
}
