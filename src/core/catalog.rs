//! In-memory part catalog: parts, assembly links and offers
//!
//! Parts live in an arena addressed by [`PartId`]. Assembly structure is an
//! explicit edge list ([`SubpartLink`]) owned by the assembly side, so the
//! graph never holds references back into itself. A loaded catalog is a
//! snapshot: expansion and price resolution for one rollup read from it
//! without seeing concurrent edits to the files on disk.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::{OfferId, PartNumber};
use crate::core::loader::{self, SaveError};
use crate::core::project::Project;
use crate::entities::offer::Offer;
use crate::entities::part::{Part, SubpartRef};
use crate::yaml::YamlError;

/// Arena index of a part within a [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Assembly edge: `count` of `subpart` per one `assembly`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpartLink {
    pub assembly: PartId,
    pub subpart: PartId,
    pub count: u32,
}

/// Parts, their subpart links and their offers
#[derive(Debug, Default)]
pub struct Catalog {
    parts: Vec<Part>,
    index: HashMap<PartNumber, PartId>,
    /// Outgoing links per assembly, in enumeration order
    links: Vec<Vec<SubpartLink>>,
    /// Offers per part, in enumeration order (ULID order on load)
    offers: Vec<Vec<Offer>>,
    dirty_parts: BTreeSet<PartId>,
    dirty_offers: BTreeSet<OfferId>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every part and offer in the project
    pub fn load(project: &Project) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        let parts: Vec<(PathBuf, Part)> = loader::load_all(project)?;
        let mut pending = Vec::with_capacity(parts.len());
        for (_, mut part) in parts {
            let refs = std::mem::take(&mut part.subparts);
            let id = catalog.insert_part(part)?;
            pending.push((id, refs));
        }

        // Links are resolved once every part is known, so files load in any order
        for (assembly, refs) in pending {
            for r in refs {
                let subpart = catalog.part_id(&r.part).ok_or_else(|| CatalogError::DanglingSubpart {
                    assembly: catalog.parts[assembly.0].number.clone(),
                    subpart: r.part.clone(),
                })?;
                catalog.links[assembly.0].push(SubpartLink {
                    assembly,
                    subpart,
                    count: r.count,
                });
            }
            catalog.sync_refs(assembly);
        }

        let offers: Vec<(PathBuf, Offer)> = loader::load_all(project)?;
        for (_, offer) in offers {
            let part = catalog
                .part_id(&offer.part)
                .ok_or_else(|| CatalogError::DanglingOffer {
                    offer: offer.id,
                    part: offer.part.clone(),
                })?;
            catalog.offers[part.0].push(offer);
        }
        for list in &mut catalog.offers {
            list.sort_by_key(|o| o.id);
        }

        catalog.dirty_parts.clear();
        tracing::debug!(parts = catalog.parts.len(), "catalog loaded");
        Ok(catalog)
    }

    fn insert_part(&mut self, part: Part) -> Result<PartId, CatalogError> {
        if self.index.contains_key(&part.number) {
            return Err(CatalogError::DuplicatePart(part.number));
        }
        let id = PartId(self.parts.len());
        self.index.insert(part.number.clone(), id);
        self.parts.push(part);
        self.links.push(Vec::new());
        self.offers.push(Vec::new());
        self.dirty_parts.insert(id);
        Ok(id)
    }

    /// Add a new part; any subparts it lists must already exist
    pub fn add_part(&mut self, mut part: Part) -> Result<PartId, CatalogError> {
        let refs = std::mem::take(&mut part.subparts);
        let resolved = refs
            .iter()
            .map(|r| {
                self.part_id(&r.part)
                    .map(|id| (id, r.count))
                    .ok_or_else(|| CatalogError::DanglingSubpart {
                        assembly: part.number.clone(),
                        subpart: r.part.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.insert_part(part)?;
        self.replace_subparts(id, resolved);
        Ok(id)
    }

    /// Look up a part by number
    pub fn part_id(&self, number: &PartNumber) -> Option<PartId> {
        self.index.get(number).copied()
    }

    /// Look up a part by number, failing if unknown
    pub fn resolve(&self, number: &PartNumber) -> Result<PartId, CatalogError> {
        self.part_id(number)
            .ok_or_else(|| CatalogError::UnknownPart(number.clone()))
    }

    /// Look up a part by its rendered number
    pub fn resolve_str(&self, number: &str) -> Result<PartId, CatalogError> {
        let number: PartNumber = number
            .trim()
            .parse()
            .map_err(|e: crate::core::identity::PartNumberError| CatalogError::InvalidPartNumber(e.to_string()))?;
        self.resolve(&number)
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.0]
    }

    pub fn part_by_number(&self, number: &PartNumber) -> Option<&Part> {
        self.part_id(number).map(|id| self.part(id))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All part IDs ordered by part number
    pub fn sorted_part_ids(&self) -> Vec<PartId> {
        let mut ids: Vec<PartId> = (0..self.parts.len()).map(PartId).collect();
        ids.sort_by(|a, b| self.parts[a.0].number.cmp(&self.parts[b.0].number));
        ids
    }

    /// Outgoing links of an assembly, in enumeration order
    pub fn subparts_of(&self, assembly: PartId) -> &[SubpartLink] {
        &self.links[assembly.0]
    }

    /// Append a link; repeated links to the same subpart are kept as-is
    pub fn add_subpart(&mut self, assembly: PartId, subpart: PartId, count: u32) -> SubpartLink {
        let link = SubpartLink {
            assembly,
            subpart,
            count,
        };
        self.links[assembly.0].push(link);
        self.sync_refs(assembly);
        link
    }

    /// Remove every link from `assembly` to `subpart`, returning how many went
    pub fn remove_subpart(&mut self, assembly: PartId, subpart: PartId) -> usize {
        let before = self.links[assembly.0].len();
        self.links[assembly.0].retain(|l| l.subpart != subpart);
        let removed = before - self.links[assembly.0].len();
        if removed > 0 {
            self.sync_refs(assembly);
        }
        removed
    }

    /// Replace the whole subpart set of an assembly
    pub fn replace_subparts(&mut self, assembly: PartId, subparts: Vec<(PartId, u32)>) {
        self.links[assembly.0] = subparts
            .into_iter()
            .map(|(subpart, count)| SubpartLink {
                assembly,
                subpart,
                count,
            })
            .collect();
        self.sync_refs(assembly);
    }

    /// Assemblies that directly contain `part`, in arena order
    pub fn where_used(&self, part: PartId) -> Vec<PartId> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, links)| links.iter().any(|l| l.subpart == part))
            .map(|(i, _)| PartId(i))
            .collect()
    }

    /// Offers for a part, in enumeration order
    pub fn offers_for(&self, part: PartId) -> &[Offer] {
        &self.offers[part.0]
    }

    /// Total number of offers across all parts
    pub fn offer_count(&self) -> usize {
        self.offers.iter().map(Vec::len).sum()
    }

    /// Store an offer unless an equivalent one already exists
    ///
    /// Equivalence is (seller, part, moq, unit cost). Returns `false` when the
    /// offer was a duplicate and nothing changed.
    pub fn insert_offer_if_absent(&mut self, offer: Offer) -> Result<bool, CatalogError> {
        let part = self.resolve(&offer.part)?;
        if self.offers[part.0].iter().any(|o| o.is_duplicate_of(&offer)) {
            tracing::debug!(part = %offer.part, seller = %offer.seller, "skipping duplicate offer");
            return Ok(false);
        }
        self.dirty_offers.insert(offer.id);
        self.offers[part.0].push(offer);
        Ok(true)
    }

    fn sync_refs(&mut self, assembly: PartId) {
        let refs: Vec<SubpartRef> = self.links[assembly.0]
            .iter()
            .map(|l| SubpartRef {
                part: self.parts[l.subpart.0].number.clone(),
                count: l.count,
            })
            .collect();
        self.parts[assembly.0].subparts = refs;
        self.dirty_parts.insert(assembly);
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        !self.dirty_parts.is_empty() || !self.dirty_offers.is_empty()
    }

    /// Write changed parts and offers back to the project
    pub fn save(&mut self, project: &Project) -> Result<usize, CatalogError> {
        let mut written = 0;

        for id in std::mem::take(&mut self.dirty_parts) {
            loader::save_entity(project, &self.parts[id.0])?;
            written += 1;
        }

        let dirty_offers = std::mem::take(&mut self.dirty_offers);
        for offer in self.offers.iter().flatten() {
            if dirty_offers.contains(&offer.id) {
                loader::save_entity(project, offer)?;
                written += 1;
            }
        }

        tracing::debug!(written, "catalog saved");
        Ok(written)
    }
}

/// Errors raised by catalog lookups, edits and persistence
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("part not found: {0}")]
    #[diagnostic(
        code(indabom::catalog::not_found),
        help("run `indabom part list` to see known parts")
    )]
    UnknownPart(PartNumber),

    #[error("{0}")]
    #[diagnostic(code(indabom::catalog::part_number))]
    InvalidPartNumber(String),

    #[error("part {0} already exists")]
    #[diagnostic(code(indabom::catalog::duplicate))]
    DuplicatePart(PartNumber),

    #[error("part {assembly} lists unknown subpart {subpart}")]
    #[diagnostic(code(indabom::catalog::dangling_subpart))]
    DanglingSubpart {
        assembly: PartNumber,
        subpart: PartNumber,
    },

    #[error("offer {offer} is for unknown part {part}")]
    #[diagnostic(code(indabom::catalog::dangling_offer))]
    DanglingOffer { offer: OfferId, part: PartNumber },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error(transparent)]
    Save(#[from] SaveError),
}
