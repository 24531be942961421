/// Physical-pixel backing store.
///
/// Each pixel holds premultiplied RGBA in `0.0..=1.0`. A cleared pixel is
/// fully transparent, so the map can be laid over a photo layer with
/// [`Pixmap::over`]. Read back on its own it shows against black.
pub struct Pixmap {
    pub width: usize,
    pub height: usize,
    data: Vec<[f32; 4]>,
}

impl Pixmap {
    pub fn new(width: usize, height: usize) -> Self {
        Pixmap {
            width,
            height,
            data: vec![[0.0; 4]; width * height],
        }
    }

    /// Opaque map filled from `pixel(x, y)`, which returns RGB in `0.0..=1.0`.
    pub fn from_fn(width: usize, height: usize, pixel: impl Fn(usize, usize) -> [f32; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = pixel(x, y);
                data.push([r, g, b, 1.0]);
            }
        }
        Pixmap {
            width,
            height,
            data,
        }
    }

    /// Reallocate to a new size. Contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, [0.0; 4]);
    }

    /// Clear the half-open pixel range `[x0, x1) x [y0, y1)`, clipped to the map.
    pub fn clear_region(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 {
            return;
        }
        for y in y0..y1 {
            let row = y * self.width;
            self.data[row + x0..row + x1].fill([0.0; 4]);
        }
    }

    /// Source-over composite of an opaque colour at `alpha` coverage.
    #[inline]
    pub fn blend(&mut self, x: usize, y: usize, (r, g, b): (u8, u8, u8), alpha: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0) as f32;
        if a <= 0.0 {
            return;
        }
        let px = &mut self.data[y * self.width + x];
        let src = [r, g, b].map(|c| c as f32 / 255.0 * a);
        for (dst, s) in px.iter_mut().zip(src.into_iter().chain([a])) {
            *dst = s + *dst * (1.0 - a);
        }
    }

    /// This map composited over `under`. Sizes must match; otherwise the
    /// map is returned as if drawn over black.
    pub fn over(&self, under: &Pixmap) -> Pixmap {
        if (under.width, under.height) != (self.width, self.height) {
            return Pixmap {
                width: self.width,
                height: self.height,
                data: self.data.clone(),
            };
        }
        let data = self
            .data
            .iter()
            .zip(&under.data)
            .map(|(top, bot)| {
                let keep = 1.0 - top[3];
                [
                    top[0] + bot[0] * keep,
                    top[1] + bot[1] * keep,
                    top[2] + bot[2] * keep,
                    top[3] + bot[3] * keep,
                ]
            })
            .collect();
        Pixmap {
            width: self.width,
            height: self.height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [f32; 3] {
        if x < self.width && y < self.height {
            let [r, g, b, _] = self.data[y * self.width + x];
            [r, g, b]
        } else {
            [0.0; 3]
        }
    }

    /// Opacity of a pixel.
    #[inline]
    pub fn coverage(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x][3]
        } else {
            0.0
        }
    }

    /// 8-bit colour of a pixel.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let [r, g, b] = self.get(x, y).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        (r, g, b)
    }

    /// Brightest channel, used as the lit/dark test by the encoders.
    #[inline]
    pub fn level(&self, x: usize, y: usize) -> f32 {
        let [r, g, b] = self.get(x, y);
        r.max(g).max(b)
    }
}
