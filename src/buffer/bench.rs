//! Timing comparisons for load and conversion paths
