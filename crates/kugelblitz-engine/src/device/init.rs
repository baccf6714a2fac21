/// Initialization parameters for the GL device.
///
/// Defaults request a 3.3 core context, which every shader preset targets.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Requested context version as `(major, minor)`.
    pub gl_version: (u8, u8),

    /// Core profile when true, compatibility profile otherwise.
    pub core_profile: bool,

    /// Sync buffer swaps to the display refresh.
    ///
    /// Failure to apply is logged and ignored; some platforms refuse it.
    pub vsync: bool,

    /// Minimum alpha channel bits of the framebuffer config.
    pub alpha_size: u8,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            gl_version: (3, 3),
            core_profile: true,
            vsync: true,
            alpha_size: 8,
        }
    }
}
