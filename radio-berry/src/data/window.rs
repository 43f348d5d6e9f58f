//! CT 窗口: 将 HU 值映射为 8-bit 灰度值, 用于可视化.

/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width), 以 HU 为单位.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtWindow {
    level: f64,
    width: f64,
}

impl CtWindow {
    /// 构建 CT 窗.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f64, width: f64) -> Option<CtWindow> {
        if (-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// 便于展示腹部软组织 (含肿瘤) 的 CT 窗口. 窗位 40, 窗宽 400.
    #[inline]
    pub const fn from_soft_tissue() -> CtWindow {
        Self {
            level: 40.0,
            width: 400.0,
        }
    }

    /// 便于展示肝脏结构的 CT 窗口. 窗位 60, 窗宽 200.
    #[inline]
    pub const fn from_liver_visual() -> CtWindow {
        Self {
            level: 60.0,
            width: 200.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `hu` 对应的灰度值 (0 <= value <= 255).
    pub fn eval(&self, hu: i16) -> u8 {
        let hu = hu as f64;
        let lb = self.lower_bound();
        if hu <= lb {
            u8::MIN
        } else if hu >= self.upper_bound() {
            u8::MAX
        } else {
            // 255, not 256.
            ((hu - lb) / self.width * 255.0) as u8
        }
    }
}

impl Default for CtWindow {
    #[inline]
    fn default() -> Self {
        Self::from_soft_tissue()
    }
}

#[cfg(test)]
mod tests {
    use super::CtWindow;

    #[test]
    fn test_ct_window_invalid_input() {
        assert!(CtWindow::new(0.0, -1.0).is_none());
        assert!(CtWindow::new(0.0, 0.0).is_none());
        assert!(CtWindow::new(f64::NAN, 10.0).is_none());
        assert!(CtWindow::new(40.0, 400.0).is_some());
    }

    #[test]
    fn test_ct_window_eval() {
        // [60, 100]
        let ct = CtWindow::new(80.0, 40.0).unwrap();
        assert_eq!(ct.eval(i16::MIN), 0);
        assert_eq!(ct.eval(i16::MAX), 255);
        assert_eq!(ct.eval(50), 0);
        assert_eq!(ct.eval(60), 0);
        assert_eq!(ct.eval(70), (255.0 * 0.25) as u8);
        assert_eq!(ct.eval(80), (255.0 * 0.5) as u8);
        assert_eq!(ct.eval(99), 248);
        assert_eq!(ct.eval(100), 255);
    }

    #[test]
    fn test_ct_window_presets() {
        let w = CtWindow::default();
        assert_eq!(w.lower_bound(), -160.0);
        assert_eq!(w.upper_bound(), 240.0);
        assert_eq!(CtWindow::from_liver_visual().level(), 60.0);
    }
}
