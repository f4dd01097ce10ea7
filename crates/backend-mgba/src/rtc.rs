use virtual_rtc::{Restore, VirtualRtc};

use crate::engine::RtcSource;

impl RtcSource for VirtualRtc {
    fn unix_time(&mut self) -> i64 {
        VirtualRtc::unix_time(self)
    }

    fn serialize(&self) -> Vec<u8> {
        VirtualRtc::serialize(self).to_vec()
    }

    fn deserialize(&mut self, record: &[u8]) -> bool {
        VirtualRtc::deserialize(self, record) == Restore::Restored
    }
}
