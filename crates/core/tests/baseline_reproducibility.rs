//! Bit-for-bit reproducibility of the third-moment kernel.
//!
//! Checks the convective profile against `w3` bits recorded from an earlier
//! build, then generates traces over the standard case shapes and compares
//! reruns. The recorded bits catch changes to the closure arithmetic; the
//! generated traces catch changes in scheduling and thread count.

use shoc_w3_core::{
    baseline::{
        compute_cases, open_strategy, read_record, BaselineStrategy, CompareBaseline,
        GenerateBaseline,
    },
    config::{BaselineConfig, CaseShape, DEFAULT_CASES},
    run_reproducibility_suite, BaselineAction, BaselineError, ClosureMode, ConvectiveProfile,
    HarnessConfig,
};
use std::io::Cursor;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn w3_bits(config: &HarnessConfig) -> Vec<Vec<u64>> {
    compute_cases(config)
        .unwrap()
        .iter()
        .map(|data| data.w3.as_slice().iter().map(|v| v.to_bits()).collect())
        .collect()
}

/// `w3.to_bits()` of the two-column convective profile, one row per column.
const RECORDED_CONVECTIVE_W3: [[u64; 6]; 2] = [
    [
        0x0000000000000000,
        0xbfd1b5a60b4d1cfe,
        0x3fa70e5970db8d42,
        0x3ff7a63eefe83b10,
        0xbffe08a45dcdac34,
        0x0000000000000000,
    ],
    [
        0x0000000000000000,
        0xbfe1d05e10f9a65d,
        0x3fb9e767f3dd6072,
        0x4007bd7d535f42a4,
        0xc00e1c16f87093d4,
        0x0000000000000000,
    ],
];

#[test]
fn test_convective_profile_matches_recorded_bits() {
    let (general, _) = ConvectiveProfile::default().compute_both(2).unwrap();

    let mut recorded = general.clone();
    for (column, bits) in RECORDED_CONVECTIVE_W3.iter().enumerate() {
        for (level, &b) in bits.iter().enumerate() {
            recorded.w3.set(level, column, f64::from_bits(b));
        }
    }

    let mut generate = GenerateBaseline::new(Vec::new());
    generate.process(std::slice::from_ref(&recorded)).unwrap();
    let trace = generate.into_inner();

    let report = CompareBaseline::new(Cursor::new(trace))
        .process(std::slice::from_ref(&general))
        .unwrap();
    assert_eq!(report.cases, 1);
    assert_eq!(report.values, 12);
}

#[test]
fn test_default_cases_cover_small_and_large_grids() {
    let config = HarnessConfig::default();
    assert!(config.cases.len() >= 4);
    assert!(config.cases.iter().any(|c| c.num_levels == 7));
    assert!(config.cases.iter().any(|c| c.num_levels == 71));
}

#[test]
fn test_generate_then_compare_in_memory() {
    let config = HarnessConfig {
        seed: 12345,
        ..HarnessConfig::default()
    };
    let cases = compute_cases(&config).unwrap();
    assert_eq!(cases.len(), DEFAULT_CASES.len());

    let mut generate = GenerateBaseline::new(Vec::new());
    generate.process(&cases).unwrap();
    let trace = generate.into_inner();

    let mut cursor = Cursor::new(&trace);
    for (case, shape) in DEFAULT_CASES.iter().enumerate() {
        let record = read_record(&mut cursor).unwrap().unwrap();
        assert_eq!(record.num_columns(), shape.num_columns, "case {case}");
        assert_eq!(record.num_levels(), shape.num_levels, "case {case}");
    }
    assert!(read_record(&mut cursor).unwrap().is_none());

    // A fresh run from the same seed must match bit for bit.
    let rerun = compute_cases(&config).unwrap();
    let report = CompareBaseline::new(Cursor::new(trace))
        .process(&rerun)
        .unwrap();
    assert_eq!(report.cases, 4);
    assert_eq!(report.values, 10 * 72 + 10 * 13 + 7 * 17 + 2 * 8);
}

#[test]
fn test_result_is_independent_of_thread_count() {
    let config = HarnessConfig {
        seed: 7,
        ..HarnessConfig::default()
    };
    let run_with = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| w3_bits(&config))
    };
    let serial = run_with(1);
    assert_eq!(serial, run_with(4));
    assert_eq!(serial, run_with(13));
}

#[test]
fn test_reduced_closure_trace_is_all_zero() {
    let config = HarnessConfig {
        closure: ClosureMode::ReducedTke,
        ..HarnessConfig::default()
    };
    for bits in w3_bits(&config) {
        assert!(bits.iter().all(|&b| b == 0));
    }
}

#[test]
fn test_file_backed_suite_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("w3.bin");
    let config = |action: BaselineAction| HarnessConfig {
        seed: 99,
        cases: vec![CaseShape::new(3, 7), CaseShape::new(2, 12)],
        baseline: BaselineConfig {
            action,
            path: path.clone(),
        },
        ..HarnessConfig::default()
    };

    let generated = run_reproducibility_suite(&config(BaselineAction::Generate)).unwrap();
    assert_eq!(generated.action, BaselineAction::Generate);
    assert!(path.exists());

    let compared = run_reproducibility_suite(&config(BaselineAction::Compare)).unwrap();
    assert_eq!(compared.action, BaselineAction::Compare);
    assert_eq!(compared.values, generated.values);

    // Comparing under a different seed regenerates different inputs.
    let reseeded = HarnessConfig {
        seed: 100,
        ..config(BaselineAction::Compare)
    };
    assert!(matches!(
        run_reproducibility_suite(&reseeded),
        Err(BaselineError::InputDrift { case: 0, .. })
    ));
}

#[test]
fn test_tampered_trace_reports_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("w3.bin");
    let config = HarnessConfig {
        seed: 5,
        cases: vec![CaseShape::new(2, 7)],
        ..HarnessConfig::default()
    };
    let mut cases = compute_cases(&config).unwrap();
    open_strategy(BaselineAction::Generate, &path)
        .unwrap()
        .process(&cases)
        .unwrap();

    // Nudge one interior value by a single ulp.
    let value = cases[0].w3.get(3, 1);
    cases[0].w3.set(3, 1, f64::from_bits(value.to_bits() + 1));

    let err = open_strategy(BaselineAction::Compare, &path)
        .unwrap()
        .process(&cases)
        .unwrap_err();
    match err {
        BaselineError::Mismatch {
            case,
            index,
            expected,
            ..
        } => {
            assert_eq!(case, 0);
            assert_eq!(index, 8 + 3);
            assert_eq!(expected.to_bits(), value.to_bits());
        }
        other => panic!("expected a mismatch, got {other}"),
    }
}

#[test]
fn test_compare_without_trace_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    assert!(matches!(
        open_strategy(BaselineAction::Compare, &missing),
        Err(BaselineError::Io(_))
    ));
}
