//! Stress and internal force recovery from a solved displacement field

use std::collections::BTreeMap;

use crate::assembly::{Assembler, AxialForces, ResolvedElement};
use crate::elements::ElementId;
use crate::error::{FemError, FemResult};
use crate::math::{cst_stress, quad4_stress, BeamMatrices, LocalLoad, Vec as FEVec, Vec6, Vec8};
use crate::results::{BeamForces, ElementStress};

/// Smallest reported diagram maximum
pub const DIAGRAM_SCALE_FLOOR: f64 = 1e-10;

/// Recovered fields of one solve
#[derive(Debug, Clone, Default)]
pub struct PostProcessed {
    pub element_stresses: BTreeMap<ElementId, ElementStress>,
    pub beam_forces: BTreeMap<ElementId, BeamForces>,
    pub max_von_mises: f64,
    pub min_von_mises: f64,
}

fn gather<const N: usize>(u: &FEVec, dofs: &[usize; N]) -> nalgebra::SVector<f64, N> {
    nalgebra::SVector::<f64, N>::from_fn(|i, _| u[dofs[i]])
}

/// Internal force diagrams of a beam from its local end forces
///
/// `f` acts on the element in local axes. Stations are evenly spaced,
/// at least two.
pub fn interpolate_stations(
    f: &Vec6,
    length: f64,
    load: Option<&LocalLoad>,
    load_factor: f64,
    num_stations: usize,
) -> BeamForces {
    let n1 = -f[0];
    let v1 = f[1];
    let m1 = -f[2];

    let (qx, qy, la, lb) = match load {
        Some(l) => {
            let (la, lb) = l.region(length);
            (l.qx * load_factor, l.qy * load_factor, la, lb)
        }
        None => (0.0, 0.0, 0.0, 0.0),
    };

    let count = num_stations.max(2);
    let mut stations = Vec::with_capacity(count);
    let mut normal_force = Vec::with_capacity(count);
    let mut shear_force = Vec::with_capacity(count);
    let mut bending_moment = Vec::with_capacity(count);

    for k in 0..count {
        let x = length * k as f64 / (count - 1) as f64;
        // loaded length left of x
        let xi = (x - la).clamp(0.0, lb - la);
        stations.push(x);
        normal_force.push(n1 - qx * xi);
        shear_force.push(v1 + qy * xi);
        bending_moment.push(m1 + v1 * x + qy * xi * (x - la - xi / 2.0));
    }

    // floored so clients can scale diagrams by it
    let abs_max = |values: &[f64]| {
        values
            .iter()
            .fold(DIAGRAM_SCALE_FLOOR, |m, v| m.max(v.abs()))
    };

    BeamForces {
        n1,
        v1,
        m1,
        n2: f[3],
        v2: -f[4],
        m2: f[5],
        length,
        max_n: abs_max(&normal_force),
        max_v: abs_max(&shear_force),
        max_m: abs_max(&bending_moment),
        stations,
        normal_force,
        shear_force,
        bending_moment,
    }
}

/// End forces and diagrams of one beam
pub fn beam_forces(
    matrices: &BeamMatrices,
    u_element: &Vec6,
    load_factor: f64,
    num_stations: usize,
) -> BeamForces {
    let f = matrices.end_forces(u_element, load_factor);
    interpolate_stations(
        &f,
        matrices.geometry.length,
        matrices.load.as_ref(),
        load_factor,
        num_stations,
    )
}

/// Stress of a triangle or quad, `None` for beams
pub fn element_stress(element: &ResolvedElement<'_>, u: &FEVec) -> FemResult<Option<ElementStress>> {
    let s = match element {
        ResolvedElement::Triangle {
            id,
            coords,
            dofs,
            d,
            ..
        } => cst_stress(coords, d, &gather(u, dofs))
            .map_err(|fault| FemError::Geometry { element: *id, fault })?,
        ResolvedElement::Quad {
            id,
            coords,
            dofs,
            d,
            ..
        } => {
            let ue: Vec8 = gather(u, dofs);
            quad4_stress(coords, d, &ue)
                .map_err(|fault| FemError::Geometry { element: *id, fault })?
        }
        ResolvedElement::Beam { .. } => return Ok(None),
    };
    Ok(Some(ElementStress::from_components(s[0], s[1], s[2])))
}

/// Tension-positive axial force of every beam
///
/// Taken from the local end forces. `previous` supplies the axial forces
/// whose geometric stiffness `u` was solved with.
pub fn axial_forces(
    assembler: &Assembler<'_>,
    u: &FEVec,
    load_factor: f64,
    previous: Option<&AxialForces>,
) -> FemResult<AxialForces> {
    let mut forces = AxialForces::new();
    for element in assembler.elements() {
        let ResolvedElement::Beam { beam, dofs, .. } = element else {
            continue;
        };
        let n_prev = previous.and_then(|p| p.get(&beam.id).copied());
        if let Some(m) = element.beam_matrices(n_prev)? {
            let f = m.end_forces(&gather(u, dofs), load_factor);
            forces.insert(beam.id, -f[0]);
        }
    }
    Ok(forces)
}

/// Recover stresses and beam forces for every active element
pub fn post_process(
    assembler: &Assembler<'_>,
    u: &FEVec,
    load_factor: f64,
    axial: Option<&AxialForces>,
    num_stations: usize,
) -> FemResult<PostProcessed> {
    let mut out = PostProcessed::default();

    for element in assembler.elements() {
        match element {
            ResolvedElement::Beam { beam, dofs, .. } => {
                let n = axial.and_then(|a| a.get(&beam.id).copied());
                if let Some(m) = element.beam_matrices(n)? {
                    let forces = beam_forces(&m, &gather(u, dofs), load_factor, num_stations);
                    out.beam_forces.insert(beam.id, forces);
                }
            }
            _ => {
                if let Some(stress) = element_stress(element, u)? {
                    out.element_stresses.insert(element.id(), stress);
                }
            }
        }
    }

    if !out.element_stresses.is_empty() {
        let vm = out.element_stresses.values().map(|s| s.von_mises);
        out.max_von_mises = vm.clone().fold(f64::NEG_INFINITY, f64::max);
        out.min_von_mises = vm.fold(f64::INFINITY, f64::min);
    }

    Ok(out)
}
