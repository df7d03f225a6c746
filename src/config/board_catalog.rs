//! Board catalog: built-in boards plus entries from the config file

use crate::models::board::BoardDescriptor;

const AVR109_32U4_COMMANDLINE: &str = r#""{runtime.tools.avrdude.path}/bin/avrdude" "-C{runtime.tools.avrdude.path}/etc/avrdude.conf" {upload.verbose}  -patmega32u4 -cavr109 -P{serial.port} -b57600 -D "-Uflash:w:{build.path}/{build.project_name}.hex:i""#;

const ARDUINO_328P_COMMANDLINE: &str = r#""{runtime.tools.avrdude.path}/bin/avrdude" "-C{runtime.tools.avrdude.path}/etc/avrdude.conf" {upload.verbose}  -patmega328p -carduino -P{serial.port} -b115200 -D "-Uflash:w:{build.path}/{build.project_name}.hex:i""#;

const AVR109_32U4_SIGNATURE: &str = "15a80bb8e911d82ee8c36d14bc5c00348f307ac8eaba5357366eeeb776a2e4eefa85a061d22ebde27482841de67e95d471700e8487adf3adda94d2b1091c68ab4d5b5098ad6f3f0e63878be52b3459a3966e82bbf0f160f13f2fcbc2ae06f296271f19bc8fef67e038b12746fc863e76df2929ee6f2f18b604825615179da99d6a62f9e6ac6ce88f4b80c1399c9e81b734c938b34cfc1147e111bafa2ccab786cc6649baa61e45f6bf8a7a41607052207f00b3fa1c10c518804d19de55af182019ee32d99405dedfd970cd0be57953b26c6b6ca3343e25a39936583cad9894e209a38c09eb8bd74d4df99812c8a939001f0242c544b43e5f853c02de949a29a8";

const ARDUINO_328P_SIGNATURE: &str = "818f95e84bd149f2ad3cf82d383ca674b342f994921b34087afc6acc10b60370252fdf138a1f8e20666be623e13fdf976e4db145ded20cac7d324ae3f398093e8644f4f575bf65d988db0e9e4bd832756d54bc07b6478100c615ae49272f4b1eece680850fd8c63d772883783f4ea8e122a8e189e253c90978a6417cf4217e7c88d06fd2e470ffbad316537669b6db9b7de9709934aab3f12de5c3a2a8df30a91a84acf66487ed80cc286a50a598f855f4df4296eba07e49f054e0fec0d32b0928a68e6634cf656f41a3c663fbdf4e48b253dcfa02cc2d0826c216e4c2e979f5b43b1a2f171f75ea0fecf61b094a1896a8494eceda7899a4a02ca75d1f40790b";

/// Ordered board catalog; the first entry is the default selection
#[derive(Debug, Clone)]
pub struct BoardCatalog {
    boards: Vec<BoardDescriptor>,
}

impl BoardCatalog {
    pub fn new() -> Self {
        Self { boards: Vec::new() }
    }

    /// Catalog with the boards that ship with sketchbridge
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add_board(BoardDescriptor {
            id: "pololu:avr:a-star32U4".to_string(),
            label: "Pololu A-Star 32U4".to_string(),
            commandline: AVR109_32U4_COMMANDLINE.to_string(),
            signature: AVR109_32U4_SIGNATURE.to_string(),
            wait_for_upload_port: true,
            use_1200bps_touch: true,
        });
        catalog.add_board(BoardDescriptor {
            id: "arduino:avr:uno".to_string(),
            label: "Arduino Uno".to_string(),
            commandline: ARDUINO_328P_COMMANDLINE.to_string(),
            signature: ARDUINO_328P_SIGNATURE.to_string(),
            wait_for_upload_port: false,
            use_1200bps_touch: false,
        });
        catalog.add_board(BoardDescriptor {
            id: "arduino:avr:micro".to_string(),
            label: "Arduino Micro".to_string(),
            commandline: AVR109_32U4_COMMANDLINE.to_string(),
            signature: AVR109_32U4_SIGNATURE.to_string(),
            wait_for_upload_port: true,
            use_1200bps_touch: true,
        });
        catalog
    }

    /// Built-in boards extended (or overridden by id) with configured ones
    pub fn with_extra(extra: &[BoardDescriptor]) -> Self {
        let mut catalog = Self::builtin();
        for board in extra {
            catalog.add_board(board.clone());
        }
        catalog
    }

    /// Insert a board, replacing an existing entry with the same id in place
    pub fn add_board(&mut self, board: BoardDescriptor) {
        match self.boards.iter_mut().find(|b| b.id == board.id) {
            Some(existing) => *existing = board,
            None => self.boards.push(board),
        }
    }

    pub fn get_board(&self, id: &str) -> Option<&BoardDescriptor> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn default_board(&self) -> Option<&BoardDescriptor> {
        self.boards.first()
    }

    pub fn list_boards(&self) -> &[BoardDescriptor] {
        &self.boards
    }
}

impl Default for BoardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order_and_flags() {
        let catalog = BoardCatalog::builtin();
        let ids: Vec<_> = catalog.list_boards().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["pololu:avr:a-star32U4", "arduino:avr:uno", "arduino:avr:micro"]
        );
        assert_eq!(catalog.default_board().unwrap().id, "pololu:avr:a-star32U4");

        let uno = catalog.get_board("arduino:avr:uno").unwrap();
        assert!(!uno.wait_for_upload_port);
        assert!(!uno.use_1200bps_touch);
        assert!(uno.commandline.contains("-patmega328p"));
        assert_eq!(uno.signature.len(), 512);
    }

    #[test]
    fn test_extra_boards_override_by_id() {
        let custom = BoardDescriptor {
            id: "arduino:avr:uno".to_string(),
            label: "Uno (custom avrdude)".to_string(),
            commandline: "avrdude -P{serial.port}".to_string(),
            signature: String::new(),
            wait_for_upload_port: false,
            use_1200bps_touch: false,
        };
        let catalog = BoardCatalog::with_extra(&[custom]);
        assert_eq!(catalog.list_boards().len(), 3);
        assert_eq!(
            catalog.get_board("arduino:avr:uno").unwrap().label,
            "Uno (custom avrdude)"
        );
        // Position is kept
        assert_eq!(catalog.list_boards()[1].id, "arduino:avr:uno");
    }
}
