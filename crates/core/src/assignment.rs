use serde::{Deserialize, Serialize};

/// Every assignment spans exactly this many zone slots.
pub const ZONE_COUNT: usize = 10;

/// What a single zone slot is told to play.
///
/// Configuration data carries this as either a bare show id (whole zone
/// plays one show) or a list of per-group show ids. `0` means inactive in
/// a base assignment and "no change" in a layered one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneSlot {
    Single(u32),
    PerGroup(Vec<u32>),
}

impl Default for ZoneSlot {
    fn default() -> Self {
        ZoneSlot::Single(0)
    }
}

impl ZoneSlot {
    /// Effective show id for group `g`, broadcasting a scalar slot to
    /// every group.
    pub fn group_value(&self, g: usize) -> u32 {
        match self {
            ZoneSlot::Single(id) => *id,
            ZoneSlot::PerGroup(ids) => ids.get(g).copied().unwrap_or(0),
        }
    }
}

/// A full show assignment: one slot per zone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowData(Vec<ZoneSlot>);

impl ShowData {
    /// All zones inactive.
    pub fn inactive() -> Self {
        ShowData(vec![ZoneSlot::default(); ZONE_COUNT])
    }

    pub fn from_slots(slots: Vec<ZoneSlot>) -> Self {
        ShowData(slots).normalized()
    }

    /// Zero-pads (or truncates) to exactly [`ZONE_COUNT`] slots.
    pub fn normalized(&self) -> Self {
        let mut slots = self.0.clone();
        slots.resize(ZONE_COUNT, ZoneSlot::default());
        ShowData(slots)
    }

    pub fn slot(&self, zone: usize) -> ZoneSlot {
        self.0.get(zone).cloned().unwrap_or_default()
    }

    /// Merges `layer` onto `self`, zone by zone.
    ///
    /// A per-group layer forces the zone into per-group form; `0` entries
    /// inherit the prior value for that group (broadcasting a scalar
    /// base). A positive scalar layer replaces the whole zone, discarding
    /// any per-group split. A zero/empty layer leaves the zone untouched.
    pub fn layered(&self, layer: &ShowData) -> ShowData {
        let mut slots = Vec::with_capacity(ZONE_COUNT);
        for z in 0..ZONE_COUNT {
            let base = self.slot(z);
            let merged = match layer.slot(z) {
                ZoneSlot::PerGroup(groups) if !groups.is_empty() => {
                    let merged_groups = groups
                        .iter()
                        .enumerate()
                        .map(|(g, &id)| if id > 0 { id } else { base.group_value(g) })
                        .collect();
                    ZoneSlot::PerGroup(merged_groups)
                }
                ZoneSlot::Single(id) if id > 0 => ZoneSlot::Single(id),
                _ => base,
            };
            slots.push(merged);
        }
        ShowData(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ShowData {
        ShowData::from_slots(vec![
            ZoneSlot::Single(3),
            ZoneSlot::PerGroup(vec![4, 5]),
            ZoneSlot::Single(0),
        ])
    }

    #[test]
    fn zero_scalar_layer_is_a_no_op() {
        let layered = base().layered(&ShowData::inactive());
        assert_eq!(layered, base().normalized());
    }

    #[test]
    fn empty_group_list_is_a_no_op() {
        let layer = ShowData::from_slots(vec![ZoneSlot::PerGroup(vec![])]);
        assert_eq!(base().layered(&layer).slot(0), ZoneSlot::Single(3));
    }

    #[test]
    fn positive_scalar_replaces_a_group_split() {
        let layer = ShowData::from_slots(vec![ZoneSlot::Single(0), ZoneSlot::Single(9)]);
        let layered = base().layered(&layer);
        assert_eq!(layered.slot(0), ZoneSlot::Single(3));
        assert_eq!(layered.slot(1), ZoneSlot::Single(9));
    }

    #[test]
    fn group_zeros_inherit_from_a_group_base() {
        let layer = ShowData::from_slots(vec![
            ZoneSlot::Single(0),
            ZoneSlot::PerGroup(vec![7, 0]),
        ]);
        let layered = base().layered(&layer);
        assert_eq!(layered.slot(1), ZoneSlot::PerGroup(vec![7, 5]));
    }

    #[test]
    fn group_zeros_broadcast_a_scalar_base() {
        let layer = ShowData::from_slots(vec![ZoneSlot::PerGroup(vec![0, 8, 0])]);
        let layered = base().layered(&layer);
        assert_eq!(layered.slot(0), ZoneSlot::PerGroup(vec![3, 8, 3]));
    }

    #[test]
    fn missing_base_groups_inherit_zero() {
        let layer = ShowData::from_slots(vec![
            ZoneSlot::Single(0),
            ZoneSlot::PerGroup(vec![0, 0, 0]),
        ]);
        let layered = base().layered(&layer);
        assert_eq!(layered.slot(1), ZoneSlot::PerGroup(vec![4, 5, 0]));
    }

    #[test]
    fn parses_mixed_scalar_and_list_slots() {
        let data: ShowData = serde_json::from_str("[3, [1, 2, 0], 0]").unwrap();
        assert_eq!(data.slot(0), ZoneSlot::Single(3));
        assert_eq!(data.slot(1), ZoneSlot::PerGroup(vec![1, 2, 0]));
        assert_eq!(data.normalized().slot(9), ZoneSlot::Single(0));
    }
}
