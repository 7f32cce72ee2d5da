/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move toward lower rows.
    Up,
    /// Move toward higher rows.
    Down,
    /// Move toward lower columns.
    Left,
    /// Move toward higher columns.
    Right,
    /// Combat: standard attack.
    Attack,
    /// Combat: heavy attack.
    HeavyAttack,
    /// Combat: defend.
    Defend,
    /// Combat: heal.
    Heal,
    /// Toggle pause.
    Pause,
    /// Quit.
    Escape,
}

impl Key {
    /// Every key, in bit order.
    pub const ALL: [Key; 10] = [
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Attack,
        Key::HeavyAttack,
        Key::Defend,
        Key::Heal,
        Key::Pause,
        Key::Escape,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Map an input-script symbol to a key.
    ///
    /// `U D L R` move, `a h d r` pick combat actions, `p` pauses, `q` quits.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'U' => Some(Self::Up),
            'D' => Some(Self::Down),
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            'a' => Some(Self::Attack),
            'h' => Some(Self::HeavyAttack),
            'd' => Some(Self::Defend),
            'r' => Some(Self::Heal),
            'p' => Some(Self::Pause),
            'q' => Some(Self::Escape),
            _ => None,
        }
    }
}

/// A snapshot of which keys are held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    bits: u16,
}

impl KeyState {
    /// A snapshot with no keys held.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mark `key` as held.
    pub fn press(&mut self, key: Key) {
        self.bits |= key.bit();
    }

    /// Mark `key` as released.
    pub fn release(&mut self, key: Key) {
        self.bits &= !key.bit();
    }

    /// Builder form of [`KeyState::press`].
    pub fn with(mut self, key: Key) -> Self {
        self.press(key);
        self
    }

    /// Whether `key` is held.
    pub fn is_pressed(&self, key: Key) -> bool {
        self.bits & key.bit() != 0
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Held keys in bit order.
    pub fn pressed(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|k| self.is_pressed(*k))
    }
}

impl FromIterator<Key> for KeyState {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut state = Self::empty();
        for key in iter {
            state.press(key);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = KeyState::empty();
        assert!(keys.is_empty());
        keys.press(Key::Up);
        keys.press(Key::Attack);
        assert!(keys.is_pressed(Key::Up));
        assert!(!keys.is_pressed(Key::Down));
        keys.release(Key::Up);
        assert!(!keys.is_pressed(Key::Up));
        assert_eq!(keys.pressed().collect::<Vec<_>>(), vec![Key::Attack]);
    }

    #[test]
    fn collect_from_symbols() {
        let keys: KeyState = "Uq?".chars().filter_map(Key::from_symbol).collect();
        assert!(keys.is_pressed(Key::Up));
        assert!(keys.is_pressed(Key::Escape));
        assert_eq!(keys.pressed().count(), 2);
    }
}
