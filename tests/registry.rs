//! Integration tests for the operator registry

mod common;

use common::init_logger;
use topocluster::error::Error;
use topocluster::registry::{
    CENTERLINE_GROUP, CUDA_VERSION, HostTensor, IValue, OperatorRegistry, OperatorSchema,
    ReturnKind, VECTOR_RADIUS, register_cluster_ops,
};
use topocluster::runtime::Placement;

fn square(placement: Placement) -> (HostTensor, HostTensor) {
    let x = HostTensor::from_slice(
        &[-1.0f32, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0],
        &[4, 2],
        placement,
    )
    .unwrap();
    let y = HostTensor::from_slice(&[-0.5f32, -0.5, -0.5, 0.5], &[1, 4], placement).unwrap();
    (x, y)
}

fn radius_args(x: HostTensor, y: HostTensor) -> Vec<IValue> {
    vec![
        x.into(),
        y.into(),
        IValue::None,
        IValue::None,
        IValue::Double(1.0),
        IValue::Int(32),
        IValue::Int(1),
    ]
}

#[test]
fn test_cluster_ops_registered() {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    assert!(registry.contains(VECTOR_RADIUS));
    assert!(registry.contains(CENTERLINE_GROUP));
    assert!(registry.contains(CUDA_VERSION));
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec![CENTERLINE_GROUP, CUDA_VERSION, VECTOR_RADIUS]
    );
    assert!(
        registry
            .names()
            .all(|name| registry.schema(name).unwrap().namespace() == "topocluster")
    );
}

#[test]
fn test_vector_radius_through_registry() {
    init_logger();
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    let (x, y) = square(Placement::Cpu);

    let out = registry
        .call(VECTOR_RADIUS, &radius_args(x, y))
        .unwrap()
        .into_tensor()
        .unwrap();

    assert_eq!(out.placement(), Placement::Cpu);
    assert_eq!(out.shape(), &[2, 2]);
    assert_eq!(out.tensor().to_vec::<i64>(), vec![0, 0, 0, 1]);
}

#[test]
fn test_integer_radius_is_accepted() {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    let (x, y) = square(Placement::Cpu);
    let mut args = radius_args(x, y);
    args[4] = IValue::Int(1);

    let out = registry.call(VECTOR_RADIUS, &args).unwrap();
    assert_eq!(out.into_tensor().unwrap().shape(), &[2, 2]);
}

#[test]
fn test_centerline_group_through_registry() {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    let x = HostTensor::from_slice(&[0i64, 1, 0, 1], &[4, 1], Placement::Cpu).unwrap();
    let y = HostTensor::from_slice(&[0i64, 1, 1, 0], &[2, 2], Placement::Cpu).unwrap();
    let ptr_x = HostTensor::from_slice(&[0i64, 2, 4], &[3], Placement::Cpu).unwrap();
    let ptr_y = HostTensor::from_slice(&[0i64, 1, 2], &[3], Placement::Cpu).unwrap();

    let out = registry
        .call(
            CENTERLINE_GROUP,
            &[
                x.into(),
                y.into(),
                ptr_x.into(),
                ptr_y.into(),
                IValue::Int(32),
                IValue::Int(1),
            ],
        )
        .unwrap()
        .into_tensor()
        .unwrap();

    // Example 0 keeps node 1 (row 1), example 1 keeps node 0 (row 2)
    assert_eq!(out.tensor().to_vec::<i64>(), vec![0, 1, 1, 2]);
}

#[cfg(not(feature = "cuda"))]
#[test]
fn test_cuda_placement_is_unsupported() {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();

    let (x, y) = square(Placement::Cuda(0));
    let err = registry.call(VECTOR_RADIUS, &radius_args(x, y)).unwrap_err();
    assert!(
        matches!(&err, Error::UnsupportedDevice { device, op, .. }
            if device == "cuda:0" && *op == VECTOR_RADIUS),
        "unexpected error: {err}"
    );

    let x = HostTensor::from_slice(&[0i64], &[1, 1], Placement::Cuda(0)).unwrap();
    let y = HostTensor::from_slice(&[1i64], &[1, 1], Placement::Cuda(0)).unwrap();
    let err = registry
        .call(
            CENTERLINE_GROUP,
            &[x.into(), y.into(), IValue::None, IValue::None, IValue::Int(32), IValue::Int(1)],
        )
        .unwrap_err();
    assert!(
        matches!(&err, Error::UnsupportedDevice { op, reason, .. }
            if *op == CENTERLINE_GROUP && reason == "not compiled with CUDA support"),
        "unexpected error: {err}"
    );

    assert_eq!(
        registry.call(CUDA_VERSION, &[]).unwrap().as_int(),
        Some(-1)
    );
}

#[test]
fn test_schema_mismatch() {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    let (x, y) = square(Placement::Cpu);

    let mut args = radius_args(x.clone(), y.clone());
    args.truncate(5);
    assert!(matches!(
        registry.call(VECTOR_RADIUS, &args),
        Err(Error::SchemaMismatch { .. })
    ));

    let mut args = radius_args(x, y);
    args[5] = IValue::Double(32.0);
    let err = registry.call(VECTOR_RADIUS, &args).unwrap_err();
    assert!(err.to_string().contains("max_num_neighbors"), "{err}");
}

#[test]
fn test_registry_misuse() {
    let mut registry = OperatorRegistry::with_cluster_ops().unwrap();

    assert!(matches!(
        register_cluster_ops(&mut registry),
        Err(Error::DuplicateOperator { .. })
    ));
    assert!(matches!(
        registry.call("topocluster::knn", &[]),
        Err(Error::UnknownOperator { name }) if name == "topocluster::knn"
    ));

    fn noop(_: &[IValue]) -> topocluster::error::Result<IValue> {
        Ok(IValue::None)
    }
    let mut empty = OperatorRegistry::new();
    empty
        .register(OperatorSchema::new("other::noop", vec![], ReturnKind::Int), noop)
        .unwrap();
    assert_eq!(empty.len(), 1);
}
