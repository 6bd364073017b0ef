//! Reference Stencil - expected spectrum of round USD amounts
//!
//! Weights are empirically calibrated and shipped as data. Offsets are
//! relative to histogram bin 201, so with no slide the $100 weight sits on
//! bin 801. The entry after each round amount absorbs fee-reduced payments.

/// `(offset, weight)` pairs in ascending offset order
const ROUND_USD_WEIGHTS: [(usize, f64); 40] = [
    (200, 0.000_595_795_569_116_806_3), // $1
    (201, 0.000_445_479_066_230_312_8),
    (228, 0.000_176_309_939_359_891_4), // $1.50
    (229, 0.000_185_180_149_714_457_3),
    (260, 0.000_620_561_648_188_579_4), // $2
    (261, 0.000_598_569_686_058_498_4),
    (295, 0.000_691_950_572_804_661_9), // $3
    (296, 0.000_891_293_307_834_284_0),
    (339, 0.000_937_291_623_880_420_5), // $5
    (340, 0.001_712_552_298_503_472_4),
    (399, 0.002_170_234_722_314_303_0),
    (400, 0.003_701_862_232_641_138_0), // $10
    (401, 0.002_732_216_870_674_380_2),
    (402, 0.001_626_832_258_309_767_8),
    (403, 0.001_260_195_341_649_766_4),
    (460, 0.004_142_524_288_029_546_0), // $20
    (461, 0.003_924_776_747_564_083_0),
    (495, 0.003_239_944_163_201_722_8), // $30
    (496, 0.003_711_295_900_735_558_5),
    (539, 0.004_992_190_882_837_000_0), // $50
    (540, 0.007_063_686_901_819_710_5),
    (600, 0.008_000_000_000_000_000_0), // $100
    (601, 0.006_543_138_828_242_444_0),
    (602, 0.004_427_950_920_336_173_5),
    (660, 0.004_613_244_055_174_701_5), // $200
    (661, 0.004_364_785_139_553_114_0),
    (695, 0.003_198_089_288_084_656_7), // $300
    (696, 0.003_423_764_163_248_191_0),
    (738, 0.002_599_533_550_543_503_4), // $500
    (739, 0.003_263_193_098_222_664_5),
    (740, 0.004_275_326_279_088_108_0),
    (800, 0.003_769_950_147_477_235_0), // $1,000
    (801, 0.003_087_289_106_421_576_4),
    (802, 0.002_323_704_083_679_816_3),
    (860, 0.002_367_176_421_088_989_5), // $2,000
    (861, 0.002_010_687_710_479_847_4),
    (939, 0.000_909_921_412_865_450_2), // $5,000
    (940, 0.001_200_854_679_936_149_8),
    (1000, 0.000_786_258_607_634_152_4), // $10,000
    (1001, 0.000_690_004_807_719_257_9),
];

/// Sparse table of weights at histogram offsets
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceStencil {
    weights: Vec<(usize, f64)>,
}

impl ReferenceStencil {
    /// Histogram bin that offset 0 lines up with at slide 0
    pub const WINDOW_START: usize = 201;
    /// Width of the stencil's offset domain
    pub const WINDOW_LEN: usize = 1200;

    pub fn new() -> Self {
        Self {
            weights: ROUND_USD_WEIGHTS.to_vec(),
        }
    }

    /// Populated `(offset, weight)` entries in ascending offset order
    pub fn weights(&self) -> &[(usize, f64)] {
        &self.weights
    }

    pub fn weight_at(&self, offset: usize) -> f64 {
        self.weights
            .binary_search_by_key(&offset, |&(o, _)| o)
            .map(|i| self.weights[i].1)
            .unwrap_or(0.0)
    }

    /// Lowest and highest histogram bins touched at slide 0
    pub fn bin_span(&self) -> (usize, usize) {
        let first = self.weights.first().map(|&(o, _)| o).unwrap_or(0);
        let last = self.weights.last().map(|&(o, _)| o).unwrap_or(0);
        (Self::WINDOW_START + first, Self::WINDOW_START + last)
    }

    /// Dot product of the stencil with `curve` shifted by `slide` bins.
    ///
    /// Returns `None` if the shifted stencil falls off either end of the
    /// curve.
    pub fn score(&self, curve: &[f64], slide: i64) -> Option<f64> {
        let mut score = 0.0;
        for &(offset, weight) in &self.weights {
            let bin = (Self::WINDOW_START + offset) as i64 + slide;
            let value = usize::try_from(bin).ok().and_then(|b| curve.get(b))?;
            score += value * weight;
        }
        Some(score)
    }
}

impl Default for ReferenceStencil {
    fn default() -> Self {
        Self::new()
    }
}
