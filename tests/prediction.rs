use algobridge::{
    BridgeError, Context, Handle, InputId, Precision, Predictable, PredictionBatch,
    PredictionMethod,
};
use approx::assert_relative_eq;
use rstest::{fixture, rstest};

#[fixture]
fn ctx() -> Context {
    algobridge::init().unwrap();
    Context::new().unwrap()
}

#[rstest]
#[case("float", Precision::Single)]
#[case("double", Precision::Double)]
fn accepted_numeric_types_select_precision(
    ctx: Context,
    #[case] tag: &str,
    #[case] expected: Precision,
) {
    let batch = PredictionBatch::from_tags(&ctx, tag, 0).unwrap();
    assert_eq!(batch.precision(), expected);
    assert_eq!(batch.method(), PredictionMethod::DefaultDense);
    ctx.dispose().unwrap();
}

#[rstest]
#[case("int")]
#[case("long")]
#[case("Float")]
#[case("f64")]
fn other_numeric_types_are_invalid(ctx: Context, #[case] tag: &str) {
    let err = PredictionBatch::from_tags(&ctx, tag, 0).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfiguration(ref m) if m.contains("type")));
    assert!(ctx.allocated().unwrap().is_empty());
}

#[rstest]
#[case("double", 1)]
#[case("float", -1)]
#[case("int", 7)]
fn unsupported_method_is_reported_regardless_of_type(
    ctx: Context,
    #[case] tag: &str,
    #[case] method: i32,
) {
    let err = PredictionBatch::from_tags(&ctx, tag, method).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfiguration(ref m) if m.contains("method")));
}

#[rstest]
fn parameter_starts_at_defaults(ctx: Context) {
    let batch =
        PredictionBatch::new(&ctx, Precision::Single, PredictionMethod::DefaultDense).unwrap();
    let param = batch.parameter();
    assert_relative_eq!(param.accuracy_threshold().unwrap(), 0.3);
    assert_eq!(param.max_iterations().unwrap(), 10);
    assert_relative_eq!(param.newton_raphson_accuracy_threshold().unwrap(), 1.0e-3);
    assert_eq!(param.newton_raphson_max_iterations().unwrap(), 100);
    assert_relative_eq!(param.degenerate_cases_threshold().unwrap(), 1.0e-2);
    ctx.dispose().unwrap();
}

#[rstest]
fn clone_is_independent_of_its_source(ctx: Context) {
    let original =
        PredictionBatch::new(&ctx, Precision::Double, PredictionMethod::DefaultDense).unwrap();
    original.parameter().set_max_iterations(40).unwrap();
    original.parameter().set_accuracy_threshold(0.25).unwrap();

    let copy = original.clone_in(&ctx).unwrap();
    assert_ne!(copy.handle(), original.handle());
    assert_ne!(copy.parameter().handle(), original.parameter().handle());
    assert_eq!(copy.method(), original.method());
    assert_eq!(copy.precision(), original.precision());
    assert_eq!(copy.parameter().max_iterations().unwrap(), 40);
    assert_relative_eq!(copy.parameter().accuracy_threshold().unwrap(), 0.25);

    copy.parameter().set_max_iterations(5).unwrap();
    original.parameter().set_degenerate_cases_threshold(0.5).unwrap();
    assert_eq!(original.parameter().max_iterations().unwrap(), 40);
    assert_relative_eq!(copy.parameter().degenerate_cases_threshold().unwrap(), 1.0e-2);

    ctx.dispose().unwrap();
}

#[rstest]
fn clone_carries_input_bindings(ctx: Context) {
    let original =
        PredictionBatch::new(&ctx, Precision::Double, PredictionMethod::DefaultDense).unwrap();
    let data = Handle::from_raw(1 << 40).unwrap();
    let model = Handle::from_raw((1 << 40) + 1).unwrap();
    assert_eq!(original.input().get(InputId::Data).unwrap(), None);
    original.input().set(InputId::Data, data).unwrap();
    original.input().set(InputId::Model, model).unwrap();

    let copy = original.clone_in(&ctx).unwrap();
    assert_eq!(copy.input().get(InputId::Data).unwrap(), Some(data));
    assert_eq!(copy.input().get(InputId::Model).unwrap(), Some(model));

    copy.input().set(InputId::Data, model).unwrap();
    assert_eq!(original.input().get(InputId::Data).unwrap(), Some(data));
    ctx.dispose().unwrap();
}

#[rstest]
fn parameter_snapshot_is_json(ctx: Context) {
    let batch =
        PredictionBatch::new(&ctx, Precision::Double, PredictionMethod::DefaultDense).unwrap();
    batch.parameter().set_newton_raphson_max_iterations(7).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&batch.parameter().to_json().unwrap()).unwrap();
    assert_eq!(json["newton_raphson_max_iterations"], 7);
    assert_eq!(json["max_iterations"], 10);
    ctx.dispose().unwrap();
}

#[rstest]
fn dispose_releases_algorithm_and_parameter(ctx: Context) {
    let batch =
        PredictionBatch::new(&ctx, Precision::Double, PredictionMethod::DefaultDense).unwrap();
    let copy = batch.clone_in(&ctx).unwrap();
    assert_eq!(ctx.allocated().unwrap(), vec![batch.handle(), copy.handle()]);

    assert_eq!(ctx.dispose().unwrap(), 2);
    assert!(ctx.allocated().unwrap().is_empty());
    assert!(matches!(
        batch.parameter().max_iterations(),
        Err(BridgeError::InvalidHandle(_))
    ));
    assert!(matches!(
        copy.input().get(InputId::Model),
        Err(BridgeError::InvalidHandle(_))
    ));
}

#[rstest]
fn released_handles_are_skipped_by_dispose(ctx: Context) {
    let a = PredictionBatch::new(&ctx, Precision::Single, PredictionMethod::DefaultDense).unwrap();
    let b = PredictionBatch::new(&ctx, Precision::Single, PredictionMethod::DefaultDense).unwrap();
    ctx.release(a.handle()).unwrap();
    assert_eq!(ctx.allocated().unwrap(), vec![b.handle()]);
    assert_eq!(ctx.dispose().unwrap(), 1);
}
