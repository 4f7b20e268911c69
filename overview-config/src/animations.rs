#[derive(knuffel::DecodeScalar, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    FastOutLinearIn,
    EaseOutCubic,
}

/// A fully resolved animation preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub off: bool,
    pub duration_ms: u32,
    pub curve: Curve,
}

impl Animation {
    pub const fn new(duration_ms: u32, curve: Curve) -> Self {
        Self {
            off: false,
            duration_ms,
            curve,
        }
    }

    fn merged_with(mut self, part: &AnimationPart, all_off: bool) -> Self {
        self.off |= all_off || part.off;
        if let Some(duration_ms) = part.duration_ms {
            self.duration_ms = duration_ms;
        }
        if let Some(curve) = part.curve {
            self.curve = curve;
        }
        self
    }
}

/// An animation node as written in the config, with every field optional.
#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPart {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, unwrap(argument))]
    pub duration_ms: Option<u32>,
    #[knuffel(child, unwrap(argument))]
    pub curve: Option<Curve>,
}

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq, Eq)]
pub struct Animations {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, default)]
    pub layout_on_enter: AnimationPart,
    #[knuffel(child, default)]
    pub layout_in_overview: AnimationPart,
    #[knuffel(child, default)]
    pub restore_window: AnimationPart,
    #[knuffel(child, default)]
    pub selector_move: AnimationPart,
    #[knuffel(child, default)]
    pub selector_fade_out: AnimationPart,
    #[knuffel(child, default)]
    pub shield_fade: AnimationPart,
    #[knuffel(child, default)]
    pub new_item_fade: AnimationPart,
    #[knuffel(child, default)]
    pub home_launcher_release: AnimationPart,
}

impl Animations {
    /// Windows moving from their desktop position into the grid.
    pub fn layout_on_enter(&self) -> Animation {
        Animation::new(300, Curve::EaseOut).merged_with(&self.layout_on_enter, self.off)
    }

    /// Windows moving between grid slots while overview is open.
    pub fn layout_in_overview(&self) -> Animation {
        Animation::new(300, Curve::EaseInOut).merged_with(&self.layout_in_overview, self.off)
    }

    /// Windows moving back to their desktop position on exit.
    pub fn restore_window(&self) -> Animation {
        Animation::new(300, Curve::EaseOut).merged_with(&self.restore_window, self.off)
    }

    pub fn selector_move(&self) -> Animation {
        Animation::new(250, Curve::EaseInOut).merged_with(&self.selector_move, self.off)
    }

    pub fn selector_fade_out(&self) -> Animation {
        Animation::new(250, Curve::FastOutLinearIn).merged_with(&self.selector_fade_out, self.off)
    }

    pub fn shield_fade(&self) -> Animation {
        Animation::new(250, Curve::EaseOut).merged_with(&self.shield_fade, self.off)
    }

    pub fn new_item_fade(&self) -> Animation {
        Animation::new(250, Curve::EaseIn).merged_with(&self.new_item_fade, self.off)
    }

    pub fn home_launcher_release(&self) -> Animation {
        Animation::new(250, Curve::Linear).merged_with(&self.home_launcher_release, self.off)
    }
}
