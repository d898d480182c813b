/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::cell::RefCell;

use isomode_array_types::V3;
use isomode_structure::SymmetryOperation;
use isomode_modes::{SymmetryDataProvider, Irrep, KPoint};

use crate::FailResult;
use crate::queries;
use crate::session::{ProcessSession, SessionConfig};

/// A `SymmetryDataProvider` that asks ISOTROPY.
///
/// One session is started lazily and reused.  A session whose query failed
/// is discarded, since its state is unknown.
pub struct IsotropyProvider {
    config: SessionConfig,
    session: RefCell<Option<ProcessSession>>,
}

impl IsotropyProvider {
    pub fn new(config: SessionConfig) -> Self
    { IsotropyProvider { config, session: RefCell::new(None) } }

    fn with_session<B>(&self, f: impl FnOnce(&mut ProcessSession) -> FailResult<B>) -> FailResult<B>
    {
        let mut slot = self.session.borrow_mut();
        let mut session = match slot.take() {
            Some(session) => session,
            None => ProcessSession::spawn(&self.config)?,
        };
        let result = f(&mut session);
        if result.is_ok() {
            *slot = Some(session);
        }
        result
    }

    /// The k-points of the space group with fixed coordinates.
    pub fn k_points(&self, space_group: u32) -> FailResult<Vec<KPoint>>
    { self.with_session(|session| queries::k_points(session, space_group)) }

    /// Look up the vector of a k-point by its label.
    pub fn k_point(&self, space_group: u32, label: &str) -> FailResult<KPoint>
    {
        self.k_points(space_group)?.into_iter()
            .find(|k| k.label == label)
            .ok_or_else(|| format_err!("space group {} has no k-point {}", space_group, label))
    }
}

impl SymmetryDataProvider for IsotropyProvider {
    fn operations_for(&self, space_group: u32) -> FailResult<Vec<SymmetryOperation>>
    {
        self.with_session(|session| {
            let elements = queries::elements(session, space_group)?;
            Ok(elements.into_iter().map(|e| e.operation).collect())
        })
    }

    fn irreps_for(&self, space_group: u32, k_point: &KPoint) -> FailResult<Vec<Irrep>>
    {
        self.with_session(|session| {
            let elements = queries::elements(session, space_group)?;
            let labels = queries::irrep_labels(session, space_group, &k_point.label)?;
            ensure!(!labels.is_empty(), "space group {}: no irreps at k-point {}", space_group, k_point.label);

            let mut irreps = vec![];
            for label in labels {
                let characters = queries::characters(session, space_group, &k_point.label, &label, &elements)?;
                debug!("{}: characters {:?}", label, characters);
                irreps.push(Irrep::at_k(label, V3(k_point.vector), characters));
            }
            Ok(irreps)
        })
    }
}
