//! 对称矩阵特征值.

use nalgebra::Matrix3;
use ndarray::ArrayView2;

use super::EigenSolver;
use crate::error::GeometryError;

/// 检查矩阵是否为 3 x 3 且元素均为有限值.
fn check_matrix(m: &ArrayView2<f64>) -> Result<(), GeometryError> {
    if m.dim() != (3, 3) {
        return Err(GeometryError::Eigen(format!(
            "期望 3x3 矩阵, 但得到 {:?}",
            m.dim()
        )));
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::Eigen("矩阵含有非有限值".to_string()));
    }
    Ok(())
}

/// 纯 Rust 实现 (`nalgebra`) 的对称特征值求解器. 默认后端.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricEigenSolver;

impl EigenSolver for SymmetricEigenSolver {
    fn eigenvalues(&self, covariance: ArrayView2<f64>) -> Result<[f64; 3], GeometryError> {
        check_matrix(&covariance)?;
        let m = Matrix3::from_fn(|i, j| covariance[(i, j)]);
        let ev = m.symmetric_eigenvalues();
        let mut ans = [ev[0], ev[1], ev[2]];
        ans.sort_by(f64::total_cmp);
        Ok(ans)
    }
}

/// 基于 LAPACK (`ndarray-linalg`) 的对称特征值求解器.
#[cfg(feature = "lapack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LapackEigenSolver;

#[cfg(feature = "lapack")]
impl EigenSolver for LapackEigenSolver {
    fn eigenvalues(&self, covariance: ArrayView2<f64>) -> Result<[f64; 3], GeometryError> {
        use ndarray_linalg::{EigValsh, UPLO};

        check_matrix(&covariance)?;
        let ev = covariance
            .eigvalsh(UPLO::Lower)
            .map_err(|e| GeometryError::Eigen(e.to_string()))?;
        let mut ans = [ev[0], ev[1], ev[2]];
        ans.sort_by(f64::total_cmp);
        Ok(ans)
    }
}

#[cfg(test)]
mod tests {
    use super::SymmetricEigenSolver;
    use crate::error::GeometryError;
    use crate::geometry::EigenSolver;
    use ndarray::{array, Array2};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_eigen_diagonal_sorted() {
        let m = array![[3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        let ev = SymmetricEigenSolver.eigenvalues(m.view()).unwrap();
        assert!(f64_eq(ev[0], 1.0));
        assert!(f64_eq(ev[1], 2.0));
        assert!(f64_eq(ev[2], 3.0));
    }

    #[test]
    fn test_eigen_symmetric() {
        // 特征值 1, 3 (来自左上 2x2 块) 与 5.
        let m = array![[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let ev = SymmetricEigenSolver.eigenvalues(m.view()).unwrap();
        assert!(f64_eq(ev[0], 1.0));
        assert!(f64_eq(ev[1], 3.0));
        assert!(f64_eq(ev[2], 5.0));
    }

    #[test]
    fn test_eigen_invalid_matrix() {
        let m = Array2::<f64>::zeros((2, 2));
        assert!(matches!(
            SymmetricEigenSolver.eigenvalues(m.view()),
            Err(GeometryError::Eigen(_))
        ));

        let mut m = Array2::<f64>::eye(3);
        m[(0, 1)] = f64::NAN;
        assert!(SymmetricEigenSolver.eigenvalues(m.view()).is_err());
    }

    #[cfg(feature = "lapack")]
    #[test]
    fn test_lapack_matches_default() {
        use super::LapackEigenSolver;

        let m = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 1.0]];
        let a = SymmetricEigenSolver.eigenvalues(m.view()).unwrap();
        let b = LapackEigenSolver.eigenvalues(m.view()).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(f64_eq(*x, *y));
        }
    }
}
