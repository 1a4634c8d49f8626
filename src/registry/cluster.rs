//! Registration of the cluster operators

use super::schema::{Arg, ArgKind, OperatorSchema, ReturnKind};
use super::value::{HostTensor, IValue, common_placement};
use super::OperatorRegistry;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::runtime::cuda_version;

/// Name of the segment radius operator
pub const VECTOR_RADIUS: &str = "topocluster::vector_radius";
/// Name of the centerline grouping operator
pub const CENTERLINE_GROUP: &str = "topocluster::centerline_group";
/// Name of the CUDA version query
pub const CUDA_VERSION: &str = "topocluster::cuda_version";

/// Register `vector_radius`, `centerline_group` and `cuda_version`
///
/// # Errors
///
/// `DuplicateOperator` if any of the names is already taken.
pub fn register_cluster_ops(registry: &mut OperatorRegistry) -> Result<()> {
    registry.register(vector_radius_schema(), vector_radius_op)?;
    registry.register(centerline_group_schema(), centerline_group_op)?;
    registry.register(
        OperatorSchema::new(CUDA_VERSION, vec![], ReturnKind::Int),
        cuda_version_op,
    )?;
    Ok(())
}

fn vector_radius_schema() -> OperatorSchema {
    OperatorSchema::new(
        VECTOR_RADIUS,
        vec![
            Arg::new("x", ArgKind::Tensor),
            Arg::new("y", ArgKind::Tensor),
            Arg::new("ptr_x", ArgKind::OptionalTensor),
            Arg::new("ptr_y", ArgKind::OptionalTensor),
            Arg::new("r", ArgKind::Double),
            Arg::new("max_num_neighbors", ArgKind::Int),
            Arg::new("num_workers", ArgKind::Int),
        ],
        ReturnKind::Tensor,
    )
}

fn centerline_group_schema() -> OperatorSchema {
    OperatorSchema::new(
        CENTERLINE_GROUP,
        vec![
            Arg::new("x", ArgKind::Tensor),
            Arg::new("y", ArgKind::Tensor),
            Arg::new("ptr_x", ArgKind::OptionalTensor),
            Arg::new("ptr_y", ArgKind::OptionalTensor),
            Arg::new("max_num_neighbors", ArgKind::Int),
            Arg::new("num_workers", ArgKind::Int),
        ],
        ReturnKind::Tensor,
    )
}

// Arguments have been checked against the schema by the time these run, so a
// kind mismatch here is an internal error.

fn tensor_arg<'a>(args: &'a [IValue], i: usize, op: &str) -> Result<&'a HostTensor> {
    args.get(i)
        .and_then(IValue::as_tensor)
        .ok_or_else(|| Error::Internal(format!("{op}: argument {i} is not a tensor")))
}

fn optional_tensor_arg(args: &[IValue], i: usize) -> Option<&HostTensor> {
    args.get(i).and_then(IValue::as_tensor)
}

fn double_arg(args: &[IValue], i: usize, op: &str) -> Result<f64> {
    args.get(i)
        .and_then(IValue::as_double)
        .ok_or_else(|| Error::Internal(format!("{op}: argument {i} is not a float")))
}

fn count_arg(args: &[IValue], i: usize, name: &'static str, op: &str) -> Result<usize> {
    let value = args
        .get(i)
        .and_then(IValue::as_int)
        .ok_or_else(|| Error::Internal(format!("{op}: argument {i} is not an int")))?;
    usize::try_from(value)
        .map_err(|_| Error::invalid_argument(name, format!("must be non-negative, got {value}")))
}

fn vector_radius_op(args: &[IValue]) -> Result<IValue> {
    let x = tensor_arg(args, 0, VECTOR_RADIUS)?;
    let y = tensor_arg(args, 1, VECTOR_RADIUS)?;
    let ptr_x = optional_tensor_arg(args, 2);
    let ptr_y = optional_tensor_arg(args, 3);
    let r = double_arg(args, 4, VECTOR_RADIUS)?;
    let max_num_neighbors = count_arg(args, 5, "max_num_neighbors", VECTOR_RADIUS)?;
    let num_workers = count_arg(args, 6, "num_workers", VECTOR_RADIUS)?;

    let placement = common_placement(&[Some(x), Some(y), ptr_x, ptr_y])?;
    let backend = Backend::for_placement(placement, VECTOR_RADIUS)?;
    backend
        .vector_radius(x, y, ptr_x, ptr_y, r, max_num_neighbors, num_workers)
        .map(IValue::Tensor)
}

fn centerline_group_op(args: &[IValue]) -> Result<IValue> {
    let x = tensor_arg(args, 0, CENTERLINE_GROUP)?;
    let y = tensor_arg(args, 1, CENTERLINE_GROUP)?;
    let ptr_x = optional_tensor_arg(args, 2);
    let ptr_y = optional_tensor_arg(args, 3);
    let max_num_neighbors = count_arg(args, 4, "max_num_neighbors", CENTERLINE_GROUP)?;
    let num_workers = count_arg(args, 5, "num_workers", CENTERLINE_GROUP)?;

    let placement = common_placement(&[Some(x), Some(y), ptr_x, ptr_y])?;
    let backend = Backend::for_placement(placement, CENTERLINE_GROUP)?;
    backend
        .centerline_group(x, y, ptr_x, ptr_y, max_num_neighbors, num_workers)
        .map(IValue::Tensor)
}

fn cuda_version_op(_: &[IValue]) -> Result<IValue> {
    Ok(IValue::Int(cuda_version()))
}
