use changeset_core::BumpType;
use changeset_version::{bump_to_reach, increment};
use semver::Version;

/// Working state for one package while a plan is being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InternalRelease {
    pub bump_type: BumpType,
    pub old_version: Version,
    /// Version a group rule requires this release to land on.
    pub aligned_version: Option<Version>,
    pub changeset_ids: Vec<String>,
}

impl InternalRelease {
    pub fn new(bump_type: BumpType, old_version: Version) -> Self {
        Self {
            bump_type,
            old_version,
            aligned_version: None,
            changeset_ids: Vec::new(),
        }
    }

    /// The version this release produces, before prerelease decoration.
    pub fn next_version(&self) -> Version {
        let bumped = increment(&self.old_version, self.bump_type);
        match &self.aligned_version {
            Some(aligned) if *aligned > bumped => aligned.clone(),
            _ => bumped,
        }
    }

    pub fn add_changeset(&mut self, id: &str) {
        if !self.changeset_ids.iter().any(|existing| existing == id) {
            self.changeset_ids.push(id.to_string());
        }
    }
}

/// Releases indexed by package index. A slot holding a `none` release means
/// the package's manifest is rewritten without a version change.
#[derive(Debug, Clone)]
pub(crate) struct ReleaseSet {
    slots: Vec<Option<InternalRelease>>,
}

impl ReleaseSet {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn get(&self, index: usize) -> Option<&InternalRelease> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut InternalRelease> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn bump_of(&self, index: usize) -> Option<BumpType> {
        self.get(index).map(|release| release.bump_type)
    }

    /// True for an actual release; a `none` entry does not count.
    pub fn is_releasing(&self, index: usize) -> bool {
        self.bump_of(index).is_some_and(BumpType::is_release)
    }

    pub fn insert(&mut self, index: usize, release: InternalRelease) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(release);
        }
    }

    /// Sets `index` to `(bump_type, old_version)` with the given aligned
    /// version, creating the release if needed. Returns true if anything
    /// changed.
    pub fn align(
        &mut self,
        index: usize,
        bump_type: BumpType,
        old_version: &Version,
        aligned_version: Option<&Version>,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let Some(release) = slot else {
            let mut release = InternalRelease::new(bump_type, old_version.clone());
            release.aligned_version = aligned_version.cloned();
            *slot = Some(release);
            return true;
        };

        if release.bump_type == bump_type
            && release.old_version == *old_version
            && release.aligned_version.as_ref() == aligned_version
        {
            return false;
        }
        release.bump_type = bump_type;
        release.old_version = old_version.clone();
        release.aligned_version = aligned_version.cloned();
        true
    }

    /// Makes the release at `index` land on `target`, creating it from
    /// `current` if needed. The old version is kept and the bump grows to the
    /// level separating it from `target`. Returns true if anything changed.
    pub fn pin(&mut self, index: usize, current: &Version, target: &Version) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let release = slot.get_or_insert_with(|| InternalRelease::new(BumpType::None, current.clone()));

        let bump_type = release.bump_type.max(bump_to_reach(&release.old_version, target));
        if release.bump_type == bump_type && release.aligned_version.as_ref() == Some(target) {
            return false;
        }
        release.bump_type = bump_type;
        release.aligned_version = Some(target.clone());
        true
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &InternalRelease)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|release| (index, release)))
    }
}
