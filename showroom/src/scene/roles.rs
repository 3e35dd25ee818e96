use hashbrown::HashMap;

use super::NodeKey;
use crate::data::WheelPosition;

/// Meaning of a node, derived from its name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Wheel(WheelPosition),
    Suspension(WheelPosition),
    Hub(WheelPosition),
    Disc(WheelPosition),
    SteerWheelHr,
    SteerWheelLr,
    CockpitHr,
    CockpitLr,
    SeatbeltOn,
    SeatbeltOff,
}

impl NodeRole {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase();

        let role = match name.as_str() {
            "STEER_HR" => Some(Self::SteerWheelHr),
            "STEER_LR" => Some(Self::SteerWheelLr),
            "COCKPIT_HR" => Some(Self::CockpitHr),
            "COCKPIT_LR" => Some(Self::CockpitLr),
            "CINTURE_ON" => Some(Self::SeatbeltOn),
            "CINTURE_OFF" => Some(Self::SeatbeltOff),
            _ => None,
        };

        if role.is_some() {
            return role;
        }

        let (prefix, suffix) = name.split_once('_')?;
        let position = WheelPosition::from_suffix(suffix)?;

        match prefix {
            "WHEEL" => Some(Self::Wheel(position)),
            "SUSP" => Some(Self::Suspension(position)),
            "HUB" => Some(Self::Hub(position)),
            "DISC" => Some(Self::Disc(position)),
            _ => None,
        }
    }

    /// Node name in the form the model format uses.
    pub fn node_name(self) -> String {
        match self {
            Self::Wheel(position) => format!("WHEEL_{}", position.suffix()),
            Self::Suspension(position) => format!("SUSP_{}", position.suffix()),
            Self::Hub(position) => format!("HUB_{}", position.suffix()),
            Self::Disc(position) => format!("DISC_{}", position.suffix()),
            Self::SteerWheelHr => "STEER_HR".to_owned(),
            Self::SteerWheelLr => "STEER_LR".to_owned(),
            Self::CockpitHr => "COCKPIT_HR".to_owned(),
            Self::CockpitLr => "COCKPIT_LR".to_owned(),
            Self::SeatbeltOn => "CINTURE_ON".to_owned(),
            Self::SeatbeltOff => "CINTURE_OFF".to_owned(),
        }
    }
}

/// Role lookup built once per loaded tree. The first node with a given role
/// wins.
#[derive(Clone, Debug, Default)]
pub struct RoleTable {
    nodes: HashMap<NodeRole, NodeKey>,
}

impl RoleTable {
    pub fn build<'a>(nodes: impl IntoIterator<Item = (&'a str, NodeKey)>) -> Self {
        let mut table = HashMap::new();

        for (name, key) in nodes {
            if let Some(role) = NodeRole::from_name(name) {
                table.entry(role).or_insert(key);
            }
        }

        Self { nodes: table }
    }

    pub fn get(&self, role: NodeRole) -> Option<NodeKey> {
        self.nodes.get(&role).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
