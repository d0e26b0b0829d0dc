//! 3x3x3 邻域的偏移量与邻接表.
//!
//! 邻域内位置按 `(dz + 1) * 9 + (dh + 1) * 3 + (dw + 1)` 编号, 中心为 13.

use itertools::iproduct;
use once_cell::sync::Lazy;

/// 三维偏移量.
pub(crate) type Offset3d = (isize, isize, isize);

/// 邻域中心的编号.
pub(crate) const CENTER: usize = 13;

/// 邻域编号对应的偏移量.
pub(crate) static CUBE: Lazy<[Offset3d; 27]> = Lazy::new(|| {
    let mut cube = [(0, 0, 0); 27];
    for (i, d) in iproduct!(-1..=1, -1..=1, -1..=1).enumerate() {
        cube[i] = d;
    }
    cube
});

/// 6 邻域 (共面) 偏移量.
pub(crate) static FACES: Lazy<Vec<Offset3d>> = Lazy::new(|| {
    CUBE.iter()
        .copied()
        .filter(|&(z, h, w)| z.abs() + h.abs() + w.abs() == 1)
        .collect()
});

/// 26 邻域偏移量.
pub(crate) static FULL: Lazy<Vec<Offset3d>> =
    Lazy::new(|| CUBE.iter().copied().filter(|&d| d != (0, 0, 0)).collect());

/// 邻域内 (不含中心) 两两 26 邻接的编号表.
pub(crate) static ADJ_26: Lazy<Vec<Vec<usize>>> = Lazy::new(|| adjacency(|d| d <= 3, |_| true));

/// 18 邻域内 (不含中心) 两两 6 邻接的编号表. 角点没有任何邻接.
pub(crate) static ADJ_6_IN_18: Lazy<Vec<Vec<usize>>> =
    Lazy::new(|| adjacency(|d| d == 1, |i| manhattan(CUBE[i]) <= 2));

#[inline]
fn manhattan((z, h, w): Offset3d) -> isize {
    z.abs() + h.abs() + w.abs()
}

/// 构造邻接表. `linked(d)` 以两点偏移量的曼哈顿距离判定邻接 (且切比雪夫距离为 1),
/// `inside(i)` 限定参与的邻域位置.
fn adjacency<L, I>(linked: L, inside: I) -> Vec<Vec<usize>>
where
    L: Fn(isize) -> bool,
    I: Fn(usize) -> bool,
{
    let mut adj = vec![Vec::new(); 27];
    for (i, j) in iproduct!(0..27, 0..27) {
        if i == j || i == CENTER || j == CENTER || !inside(i) || !inside(j) {
            continue;
        }
        let (a, b) = (CUBE[i], CUBE[j]);
        let d = (a.0 - b.0, a.1 - b.1, a.2 - b.2);
        let chebyshev = d.0.abs().max(d.1.abs()).max(d.2.abs());
        if chebyshev == 1 && linked(manhattan(d)) {
            adj[i].push(j);
        }
    }
    adj
}

/// 以 `pos + d` 访问, 越界时返回 `None`.
#[inline]
pub(crate) fn shift(
    (z, h, w): (usize, usize, usize),
    (dz, dh, dw): Offset3d,
    (lz, lh, lw): (usize, usize, usize),
) -> Option<(usize, usize, usize)> {
    let z = z.checked_add_signed(dz).filter(|&v| v < lz)?;
    let h = h.checked_add_signed(dh).filter(|&v| v < lh)?;
    let w = w.checked_add_signed(dw).filter(|&v| v < lw)?;
    Some((z, h, w))
}
